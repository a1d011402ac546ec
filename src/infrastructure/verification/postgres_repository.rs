//! PostgreSQL verification token repository

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::verification::{
    CheckOutcome, ConfirmOutcome, VerificationRepository, VerificationToken,
};
use crate::domain::DomainError;
use crate::infrastructure::storage::is_unique_violation;

/// PostgreSQL implementation of VerificationRepository backed by `mail_verified`
///
/// The conditional operations are single statements that first lock the
/// token row with `SELECT ... FOR UPDATE`. A concurrent statement on the same
/// token waits for the lock and then reads the committed row, so a confirm or
/// consume is never decided on a stale snapshot.
#[derive(Debug, Clone)]
pub struct PostgresVerificationRepository {
    pool: PgPool,
}

impl PostgresVerificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationRepository for PostgresVerificationRepository {
    async fn insert(&self, token: &str) -> Result<VerificationToken, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO mail_verified (token, verified)
            VALUES ($1, FALSE)
            RETURNING id, token, verified
            "#,
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict("Verification token already exists")
            } else {
                DomainError::storage(format!("Failed to create verification token: {}", e))
            }
        })?;

        row_to_token(&row)
    }

    async fn get(&self, token: &str) -> Result<Option<VerificationToken>, DomainError> {
        let row = sqlx::query("SELECT id, token, verified FROM mail_verified WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to get verification token: {}", e))
            })?;

        row.as_ref().map(row_to_token).transpose()
    }

    async fn set_verified(&self, token: &str, verified: bool) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE mail_verified SET verified = $2 WHERE token = $1")
            .bind(token)
            .bind(verified)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to update verification token: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, token: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM mail_verified WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to delete verification token: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_verified(&self, token: &str) -> Result<ConfirmOutcome, DomainError> {
        let row = sqlx::query(
            r#"
            WITH target AS (
                SELECT id, verified FROM mail_verified
                WHERE token = $1
                FOR UPDATE
            ),
            updated AS (
                UPDATE mail_verified m SET verified = TRUE
                FROM target t
                WHERE m.id = t.id AND NOT t.verified
                RETURNING m.id
            )
            SELECT
                EXISTS (SELECT 1 FROM updated) AS changed,
                EXISTS (SELECT 1 FROM target) AS found
            "#,
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to confirm verification token: {}", e)))?;

        let (changed, found) = read_flags(&row)?;

        Ok(match (changed, found) {
            (true, _) => ConfirmOutcome::Confirmed,
            (false, true) => ConfirmOutcome::AlreadyVerified,
            (false, false) => ConfirmOutcome::NotFound,
        })
    }

    async fn take_if_verified(&self, token: &str) -> Result<CheckOutcome, DomainError> {
        let row = sqlx::query(
            r#"
            WITH target AS (
                SELECT id, verified FROM mail_verified
                WHERE token = $1
                FOR UPDATE
            ),
            consumed AS (
                DELETE FROM mail_verified m
                USING target t
                WHERE m.id = t.id AND t.verified
                RETURNING m.id
            )
            SELECT
                EXISTS (SELECT 1 FROM consumed) AS changed,
                EXISTS (SELECT 1 FROM target) AS found
            "#,
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check verification token: {}", e)))?;

        let (changed, found) = read_flags(&row)?;

        Ok(match (changed, found) {
            (true, _) => CheckOutcome::Verified,
            (false, true) => CheckOutcome::Pending,
            (false, false) => CheckOutcome::NotFound,
        })
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1 FROM mail_verified LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Verification store unavailable: {}", e)))?;

        Ok(())
    }
}

fn row_to_token(row: &sqlx::postgres::PgRow) -> Result<VerificationToken, DomainError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| DomainError::storage(format!("Invalid token id in database: {}", e)))?;
    let token: String = row
        .try_get("token")
        .map_err(|e| DomainError::storage(format!("Invalid token in database: {}", e)))?;
    let verified: bool = row
        .try_get("verified")
        .map_err(|e| DomainError::storage(format!("Invalid verified flag in database: {}", e)))?;

    Ok(VerificationToken::new(id, token, verified))
}

fn read_flags(row: &sqlx::postgres::PgRow) -> Result<(bool, bool), DomainError> {
    let changed: bool = row
        .try_get("changed")
        .map_err(|e| DomainError::storage(format!("Invalid result row: {}", e)))?;
    let found: bool = row
        .try_get("found")
        .map_err(|e| DomainError::storage(format!("Invalid result row: {}", e)))?;

    Ok((changed, found))
}
