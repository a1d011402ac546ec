//! Database migrations infrastructure

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// PostgreSQL migrator with a `_migrations` bookkeeping table
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Runs a single migration unless it is already recorded
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        let applied: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)",
        )
        .bind(migration.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))?;

        if applied {
            return Ok(false);
        }

        sqlx::query(migration.up)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query(
            "INSERT INTO _migrations (version, description) VALUES ($1, $2) ON CONFLICT (version) DO NOTHING",
        )
        .bind(migration.version)
        .bind(migration.description)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to record migration {}: {}", migration.version, e))
        })?;

        info!(
            version = migration.version,
            description = migration.description,
            "Migration applied"
        );

        Ok(true)
    }
}

/// A single-statement schema migration
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Migration version, ascending
    pub version: i64,
    /// Human-readable description
    pub description: &'static str,
    /// One idempotent SQL statement
    pub up: &'static str,
}

/// Schema for the relay tables
pub fn relay_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Create mail_users table",
            up: r#"
            CREATE TABLE IF NOT EXISTS mail_users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                api_key TEXT NOT NULL UNIQUE
            )
            "#,
        },
        Migration {
            version: 2,
            description: "Create mail_verified table",
            up: r#"
            CREATE TABLE IF NOT EXISTS mail_verified (
                id BIGSERIAL PRIMARY KEY,
                token TEXT NOT NULL UNIQUE,
                verified BOOLEAN NOT NULL DEFAULT FALSE
            )
            "#,
        },
    ]
}

/// Runs all pending relay migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());

    for migration in relay_migrations() {
        migrator.run_migration(&migration).await?;
    }

    Ok(())
}
