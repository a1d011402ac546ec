//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    next_id: i64,
    users: HashMap<i64, User>,
    /// Index for username -> user ID lookup
    username_index: HashMap<String, i64>,
    /// Index for API key -> user ID lookup
    api_key_index: HashMap<String, i64>,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.table.read().await.users.len()
    }

    /// Whether the repository holds no users
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .username_index
            .get(username)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn get_by_api_key(&self, api_key: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .api_key_index
            .get(api_key)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn create(&self, username: &str, api_key: &str) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if table.username_index.contains_key(username) {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }

        if table.api_key_index.contains_key(api_key) {
            return Err(DomainError::conflict("API key already exists"));
        }

        table.next_id += 1;
        let id = table.next_id;
        let user = User::new(id, username, api_key);

        table.username_index.insert(username.to_string(), id);
        table.api_key_index.insert(api_key.to_string(), id);
        table.users.insert(id, user.clone());

        Ok(user)
    }
}
