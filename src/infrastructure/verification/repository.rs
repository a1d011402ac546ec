//! In-memory verification token repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::verification::{
    CheckOutcome, ConfirmOutcome, VerificationRepository, VerificationToken,
};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct TokenTable {
    next_id: i64,
    tokens: HashMap<String, VerificationToken>,
}

/// In-memory implementation of VerificationRepository
///
/// Every operation holds the table lock for its whole duration, which gives
/// the conditional operations the same atomicity as their SQL counterparts.
#[derive(Debug, Default)]
pub struct InMemoryVerificationRepository {
    table: Arc<RwLock<TokenTable>>,
}

impl InMemoryVerificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens
    pub async fn len(&self) -> usize {
        self.table.read().await.tokens.len()
    }

    /// Whether the repository holds no tokens
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl VerificationRepository for InMemoryVerificationRepository {
    async fn insert(&self, token: &str) -> Result<VerificationToken, DomainError> {
        let mut table = self.table.write().await;

        if table.tokens.contains_key(token) {
            return Err(DomainError::conflict("Verification token already exists"));
        }

        table.next_id += 1;
        let record = VerificationToken::new(table.next_id, token, false);
        table.tokens.insert(token.to_string(), record.clone());

        Ok(record)
    }

    async fn get(&self, token: &str) -> Result<Option<VerificationToken>, DomainError> {
        Ok(self.table.read().await.tokens.get(token).cloned())
    }

    async fn set_verified(&self, token: &str, verified: bool) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        match table.tokens.get_mut(token) {
            Some(record) => {
                *record = VerificationToken::new(record.id(), token, verified);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, token: &str) -> Result<bool, DomainError> {
        Ok(self.table.write().await.tokens.remove(token).is_some())
    }

    async fn mark_verified(&self, token: &str) -> Result<ConfirmOutcome, DomainError> {
        let mut table = self.table.write().await;

        match table.tokens.get_mut(token) {
            None => Ok(ConfirmOutcome::NotFound),
            Some(record) if record.is_verified() => Ok(ConfirmOutcome::AlreadyVerified),
            Some(record) => {
                *record = VerificationToken::new(record.id(), token, true);
                Ok(ConfirmOutcome::Confirmed)
            }
        }
    }

    async fn take_if_verified(&self, token: &str) -> Result<CheckOutcome, DomainError> {
        let mut table = self.table.write().await;

        let verified = match table.tokens.get(token) {
            None => return Ok(CheckOutcome::NotFound),
            Some(record) => record.is_verified(),
        };

        if !verified {
            return Ok(CheckOutcome::Pending);
        }

        table.tokens.remove(token);
        Ok(CheckOutcome::Verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_starts_unverified() {
        let repo = InMemoryVerificationRepository::new();

        let record = repo.insert("t1").await.unwrap();

        assert_eq!(record.id(), 1);
        assert!(!record.is_verified());
        assert_eq!(repo.get("t1").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_set_verified_and_delete_are_noops_when_absent() {
        let repo = InMemoryVerificationRepository::new();

        assert!(!repo.set_verified("missing", true).await.unwrap());
        assert!(!repo.delete("missing").await.unwrap());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_verified_updates_flag() {
        let repo = InMemoryVerificationRepository::new();
        repo.insert("t1").await.unwrap();

        assert!(repo.set_verified("t1", true).await.unwrap());
        assert!(repo.get("t1").await.unwrap().unwrap().is_verified());
    }

    #[tokio::test]
    async fn test_mark_verified_transitions_once() {
        let repo = InMemoryVerificationRepository::new();
        repo.insert("t1").await.unwrap();

        assert_eq!(repo.mark_verified("t1").await.unwrap(), ConfirmOutcome::Confirmed);
        assert_eq!(
            repo.mark_verified("t1").await.unwrap(),
            ConfirmOutcome::AlreadyVerified
        );
        assert_eq!(
            repo.mark_verified("nope").await.unwrap(),
            ConfirmOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_take_if_verified_consumes_only_verified_tokens() {
        let repo = InMemoryVerificationRepository::new();
        repo.insert("t1").await.unwrap();

        assert_eq!(repo.take_if_verified("t1").await.unwrap(), CheckOutcome::Pending);
        assert!(repo.get("t1").await.unwrap().is_some());

        repo.mark_verified("t1").await.unwrap();

        assert_eq!(repo.take_if_verified("t1").await.unwrap(), CheckOutcome::Verified);
        assert!(repo.get("t1").await.unwrap().is_none());
        assert_eq!(repo.take_if_verified("t1").await.unwrap(), CheckOutcome::NotFound);
    }
}
