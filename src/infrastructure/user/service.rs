//! User service for tenant registration and API key resolution

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::user::{validate_username, User, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::api_key::{key_prefix, KeyGenerator};

/// Message returned for every failed API key resolution
pub const NO_KEY: &str = "no key";

/// User service for registration and authentication
#[derive(Debug)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    generator: KeyGenerator,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new user service
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            generator: KeyGenerator::api_keys(),
        }
    }

    /// Get a user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.repository.get_by_username(username).await
    }

    /// Get a user by API key
    pub async fn get_by_api_key(&self, api_key: &str) -> Result<Option<User>, DomainError> {
        self.repository.get_by_api_key(api_key).await
    }

    /// Create a new user with a freshly generated API key
    ///
    /// Fails with `Conflict` when the username is already registered.
    pub async fn create_user(&self, username: &str) -> Result<User, DomainError> {
        validate_username(username).map_err(|e| DomainError::validation(e.to_string()))?;

        let api_key = self.generator.generate();
        let user = self.repository.create(username, &api_key).await?;

        info!(user_id = user.id(), username = %user.username(), "User created");

        Ok(user)
    }

    /// Return the existing user for `username`, creating it if absent
    ///
    /// The boolean is `true` when this call created the user. A concurrent
    /// create of the same username resolves to the row that won.
    pub async fn get_or_create(&self, username: &str) -> Result<(User, bool), DomainError> {
        validate_username(username).map_err(|e| DomainError::validation(e.to_string()))?;

        if let Some(user) = self.repository.get_by_username(username).await? {
            debug!(username = %username, "Existing user found");
            return Ok((user, false));
        }

        match self.create_user(username).await {
            Ok(user) => Ok((user, true)),
            Err(e) if e.is_conflict() => {
                if let Some(user) = self.repository.get_by_username(username).await? {
                    debug!(username = %username, "User created concurrently, using stored row");
                    return Ok((user, false));
                }

                // The conflict was on the generated key; one fresh key is enough
                warn!(username = %username, "API key collision, regenerating");
                self.create_user(username).await.map(|user| (user, true))
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve a caller-supplied API key to its user
    ///
    /// A missing, empty, or unknown key is `Unauthenticated`; store
    /// failures propagate unchanged.
    pub async fn authenticate(&self, api_key: Option<&str>) -> Result<User, DomainError> {
        let api_key = match api_key.map(str::trim) {
            Some(key) if !key.is_empty() => key,
            _ => return Err(DomainError::unauthenticated(NO_KEY)),
        };

        match self.repository.get_by_api_key(api_key).await? {
            Some(user) => {
                debug!(user_id = user.id(), "API key resolved");
                Ok(user)
            }
            None => {
                warn!(key_prefix = %key_prefix(api_key), "Unknown API key");
                Err(DomainError::unauthenticated(NO_KEY))
            }
        }
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }
}
