//! Verification token repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{CheckOutcome, ConfirmOutcome, VerificationToken};
use crate::domain::DomainError;

/// Repository trait for verification token storage
#[async_trait]
pub trait VerificationRepository: Send + Sync + Debug {
    /// Persist a new unverified token
    async fn insert(&self, token: &str) -> Result<VerificationToken, DomainError>;

    /// Look up a token
    async fn get(&self, token: &str) -> Result<Option<VerificationToken>, DomainError>;

    /// Unconditionally set the verified flag; returns whether a row matched
    async fn set_verified(&self, token: &str, verified: bool) -> Result<bool, DomainError>;

    /// Unconditionally delete a token; returns whether a row was removed
    async fn delete(&self, token: &str) -> Result<bool, DomainError>;

    /// Move an unverified token to verified in a single step
    async fn mark_verified(&self, token: &str) -> Result<ConfirmOutcome, DomainError>;

    /// Report a token's state, deleting it in the same step when verified
    async fn take_if_verified(&self, token: &str) -> Result<CheckOutcome, DomainError>;

    /// Cheap round trip used by readiness probes
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
