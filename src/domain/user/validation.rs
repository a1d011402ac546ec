//! Username validation
//!
//! The username becomes the local part of the sender address
//! (`{username}@{domain}` and `verify.{username}@{domain}`), so it is
//! restricted to characters that are safe there without quoting.

use thiserror::Error;

/// Errors that can occur during username validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Username exceeds maximum length of {0} characters")]
    UsernameTooLong(usize),

    #[error("Username must start with a letter or number")]
    InvalidUsernameStart,

    #[error("Username must end with a letter or number")]
    InvalidUsernameEnd,

    #[error("Username contains invalid character: '{0}'. Only alphanumeric characters, dots, underscores, and hyphens are allowed")]
    InvalidUsernameCharacter(char),
}

const MAX_USERNAME_LENGTH: usize = 64;

/// Validate a username
///
/// Rules:
/// - Cannot be empty
/// - Maximum 64 characters
/// - Only alphanumeric characters, dots, underscores, and hyphens
/// - Must start and end with alphanumeric
pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    if username.is_empty() {
        return Err(UserValidationError::EmptyUsername);
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    for c in username.chars() {
        if !c.is_ascii_alphanumeric() && c != '.' && c != '_' && c != '-' {
            return Err(UserValidationError::InvalidUsernameCharacter(c));
        }
    }

    let bytes = username.as_bytes();

    if !bytes[0].is_ascii_alphanumeric() {
        return Err(UserValidationError::InvalidUsernameStart);
    }

    if !bytes[bytes.len() - 1].is_ascii_alphanumeric() {
        return Err(UserValidationError::InvalidUsernameEnd);
    }

    Ok(())
}
