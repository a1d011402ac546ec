//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::user::{User, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::is_unique_violation;

/// PostgreSQL implementation of UserRepository backed by `mail_users`
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query("SELECT id, username, api_key FROM mail_users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by username: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_api_key(&self, api_key: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query("SELECT id, username, api_key FROM mail_users WHERE api_key = $1")
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by API key: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, username: &str, api_key: &str) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO mail_users (username, api_key)
            VALUES ($1, $2)
            RETURNING id, username, api_key
            "#,
        )
        .bind(username)
        .bind(api_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!("Username '{}' already exists", username))
            } else {
                DomainError::storage(format!("Failed to create user: {}", e))
            }
        })?;

        row_to_user(&row)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1 FROM mail_users LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("User store unavailable: {}", e)))?;

        Ok(())
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| DomainError::storage(format!("Invalid user id in database: {}", e)))?;
    let username: String = row
        .try_get("username")
        .map_err(|e| DomainError::storage(format!("Invalid username in database: {}", e)))?;
    let api_key: String = row
        .try_get("api_key")
        .map_err(|e| DomainError::storage(format!("Invalid API key in database: {}", e)))?;

    Ok(User::new(id, username, api_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage;
    use crate::infrastructure::user::UserService;
    use std::sync::Arc;

    // Run with: DATABASE_URL=postgres://... cargo test -- --ignored

    async fn test_repository() -> PostgresUserRepository {
        PostgresUserRepository::new(storage::test_pool().await)
    }

    fn fresh_username() -> String {
        format!("user-{}", uuid::Uuid::new_v4().simple())
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_postgres_create_and_lookup() {
        let repo = test_repository().await;
        let username = fresh_username();
        let api_key = format!("mk_{}", uuid::Uuid::new_v4().simple());

        let user = repo.create(&username, &api_key).await.unwrap();

        let by_name = repo.get_by_username(&username).await.unwrap().unwrap();
        let by_key = repo.get_by_api_key(&api_key).await.unwrap().unwrap();
        assert_eq!(by_name, user);
        assert_eq!(by_key, user);
        assert!(repo.get_by_username(&fresh_username()).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_postgres_duplicate_username_is_conflict() {
        let repo = test_repository().await;
        let username = fresh_username();

        repo.create(&username, &format!("mk_{}", uuid::Uuid::new_v4().simple()))
            .await
            .unwrap();

        let err = repo
            .create(&username, &format!("mk_{}", uuid::Uuid::new_v4().simple()))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_postgres_duplicate_api_key_is_conflict() {
        let repo = test_repository().await;
        let api_key = format!("mk_{}", uuid::Uuid::new_v4().simple());

        repo.create(&fresh_username(), &api_key).await.unwrap();

        let err = repo.create(&fresh_username(), &api_key).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_postgres_concurrent_get_or_create_yields_one_user() {
        let service = Arc::new(UserService::new(Arc::new(test_repository().await)));
        let username = fresh_username();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let service = service.clone();
            let username = username.clone();
            tasks.spawn(async move { service.get_or_create(&username).await.unwrap() });
        }

        let mut users = Vec::new();
        while let Some(result) = tasks.join_next().await {
            users.push(result.unwrap());
        }

        let created = users.iter().filter(|(_, created)| *created).count();
        assert_eq!(created, 1);
        assert!(users.iter().all(|(user, _)| user == &users[0].0));
    }
}
