//! Verification token entity and lifecycle outcomes

use serde::{Deserialize, Serialize};

/// A one-time token proving control of a mailbox
///
/// Lifecycle: created unverified, verified once by the confirmation link,
/// consumed (deleted) by the authenticated check that observes it verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationToken {
    id: i64,
    token: String,
    verified: bool,
}

impl VerificationToken {
    pub fn new(id: i64, token: impl Into<String>, verified: bool) -> Self {
        Self {
            id,
            token: token.into(),
            verified,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

/// Result of clicking a confirmation link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The token moved from unverified to verified
    Confirmed,
    /// The token was already verified; nothing changed
    AlreadyVerified,
    /// No such token
    NotFound,
}

/// Result of the authenticated verification check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The token was verified and has now been consumed
    Verified,
    /// The token exists but has not been confirmed yet
    Pending,
    /// No such token, either never issued or already consumed
    NotFound,
}

impl CheckOutcome {
    /// The `verified` flag reported to clients, `None` when there is no token
    pub fn verified(&self) -> Option<bool> {
        match self {
            Self::Verified => Some(true),
            Self::Pending => Some(false),
            Self::NotFound => None,
        }
    }
}
