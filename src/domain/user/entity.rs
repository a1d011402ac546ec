//! User entity

use serde::{Deserialize, Serialize};

/// A registered relay tenant
///
/// Users are created once and never modified or deleted by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: i64,
    username: String,
    api_key: String,
}

impl User {
    pub fn new(id: i64, username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sender address for mail relayed on behalf of this user
    pub fn sender_address(&self, domain: &str) -> String {
        format!("{}@{}", self.username, domain)
    }

    /// Sender address for verification emails
    pub fn verification_sender_address(&self, domain: &str) -> String {
        format!("verify.{}@{}", self.username, domain)
    }
}
