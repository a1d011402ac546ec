//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::User;
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Lookups return `Ok(None)` when no row matches; `Err` is reserved for
/// store failures.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by API key
    async fn get_by_api_key(&self, api_key: &str) -> Result<Option<User>, DomainError>;

    /// Persist a new user, assigning its id
    ///
    /// Returns `DomainError::Conflict` when the username or API key is taken.
    async fn create(&self, username: &str, api_key: &str) -> Result<User, DomainError>;

    /// Cheap round trip used by readiness probes
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
