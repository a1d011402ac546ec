//! Verification workflow
//!
//! Token lifecycle: `create_token` issues an unverified token, `confirm`
//! (the emailed link) verifies it once, `consume` (the authenticated check)
//! reports it and deletes it when verified.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::verification::{CheckOutcome, ConfirmOutcome, VerificationRepository};
use crate::domain::DomainError;
use crate::infrastructure::api_key::{key_prefix, KeyGenerator};

/// Verification service over a token repository
#[derive(Debug)]
pub struct VerificationService<R: VerificationRepository> {
    repository: Arc<R>,
    generator: KeyGenerator,
}

impl<R: VerificationRepository> VerificationService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            generator: KeyGenerator::verification_tokens(),
        }
    }

    /// Issue a fresh unverified token
    pub async fn create_token(&self) -> Result<String, DomainError> {
        let token = self.generator.generate();

        let record = match self.repository.insert(&token).await {
            Err(e) if e.is_conflict() => {
                warn!("Verification token collision, regenerating");
                let token = self.generator.generate();
                self.repository.insert(&token).await?
            }
            other => other?,
        };

        info!(token_id = record.id(), "Verification token created");

        Ok(record.token().to_string())
    }

    /// Current verified flag, `None` when the token does not exist
    pub async fn check_token(&self, token: &str) -> Result<Option<bool>, DomainError> {
        let record = self.repository.get(token).await?;

        debug!(
            token_prefix = %key_prefix(token),
            found = record.is_some(),
            "Verification token lookup"
        );

        Ok(record.map(|r| r.is_verified()))
    }

    /// Confirmation-link click: unverified becomes verified, exactly once
    pub async fn confirm(&self, token: &str) -> Result<ConfirmOutcome, DomainError> {
        let outcome = self.repository.mark_verified(token).await?;

        match outcome {
            ConfirmOutcome::Confirmed => {
                info!(token_prefix = %key_prefix(token), "Verification token confirmed")
            }
            ConfirmOutcome::AlreadyVerified => {
                debug!(token_prefix = %key_prefix(token), "Verification token already confirmed")
            }
            ConfirmOutcome::NotFound => {
                warn!(token_prefix = %key_prefix(token), "Confirmation for unknown token")
            }
        }

        Ok(outcome)
    }

    /// Authenticated check: reports the state and consumes a verified token
    pub async fn consume(&self, token: &str) -> Result<CheckOutcome, DomainError> {
        let outcome = self.repository.take_if_verified(token).await?;

        if outcome == CheckOutcome::Verified {
            info!(token_prefix = %key_prefix(token), "Verification token consumed");
        }

        Ok(outcome)
    }

    /// Remove a token regardless of its state
    pub async fn delete_token(&self, token: &str) -> Result<bool, DomainError> {
        self.repository.delete(token).await
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::verification::repository::InMemoryVerificationRepository;

    fn service() -> (
        Arc<InMemoryVerificationRepository>,
        VerificationService<InMemoryVerificationRepository>,
    ) {
        let repo = Arc::new(InMemoryVerificationRepository::new());
        (repo.clone(), VerificationService::new(repo))
    }

    #[tokio::test]
    async fn test_created_token_is_unverified() {
        let (_, service) = service();

        let token = service.create_token().await.unwrap();

        assert_eq!(service.check_token(&token).await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_created_tokens_are_unique() {
        let (repo, service) = service();

        let a = service.create_token().await.unwrap();
        let b = service.create_token().await.unwrap();

        assert_ne!(a, b);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_missing_token_is_distinct_from_unverified() {
        let (_, service) = service();

        assert_eq!(service.check_token("never-issued").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_confirm_once_then_already_verified() {
        let (_, service) = service();
        let token = service.create_token().await.unwrap();

        assert_eq!(service.confirm(&token).await.unwrap(), ConfirmOutcome::Confirmed);
        assert_eq!(service.check_token(&token).await.unwrap(), Some(true));

        assert_eq!(
            service.confirm(&token).await.unwrap(),
            ConfirmOutcome::AlreadyVerified
        );
        assert_eq!(service.check_token(&token).await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_confirm_unknown_token() {
        let (repo, service) = service();

        assert_eq!(service.confirm("bogus").await.unwrap(), ConfirmOutcome::NotFound);
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_consume_lifecycle() {
        let (_, service) = service();
        let token = service.create_token().await.unwrap();

        assert_eq!(service.consume(&token).await.unwrap(), CheckOutcome::Pending);
        assert_eq!(service.check_token(&token).await.unwrap(), Some(false));

        service.confirm(&token).await.unwrap();

        assert_eq!(service.consume(&token).await.unwrap(), CheckOutcome::Verified);
        assert_eq!(service.consume(&token).await.unwrap(), CheckOutcome::NotFound);
        assert_eq!(service.check_token(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_confirm_after_consume_is_not_found() {
        let (_, service) = service();
        let token = service.create_token().await.unwrap();
        service.confirm(&token).await.unwrap();
        service.consume(&token).await.unwrap();

        assert_eq!(service.confirm(&token).await.unwrap(), ConfirmOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_delete_token() {
        let (_, service) = service();
        let token = service.create_token().await.unwrap();

        assert!(service.delete_token(&token).await.unwrap());
        assert!(!service.delete_token(&token).await.unwrap());
        assert_eq!(service.check_token(&token).await.unwrap(), None);
    }
}
