//! User domain
//!
//! Relay tenants: a unique username bound to a unique API key.

mod entity;
mod repository;
mod validation;

pub use entity::User;
pub use repository::UserRepository;
pub use validation::{validate_username, UserValidationError};

#[cfg(test)]
pub use repository::mock::FailingUserRepository;
