//! Application state for shared services

use std::sync::Arc;

use crate::domain::user::{User, UserRepository};
use crate::domain::verification::{CheckOutcome, ConfirmOutcome, VerificationRepository};
use crate::domain::{DomainError, MailGateway};
use crate::infrastructure::api_key::{DailyQuota, RateLimiter, DEFAULT_MAX_BUCKETS};
use crate::infrastructure::user::UserService;
use crate::infrastructure::verification::VerificationService;

/// Deployment settings the handlers need
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Key for the admin page; empty disables it
    pub admin_key: String,
    /// Sending domain, as in `alice@{domain}`
    pub domain: String,
    /// Base URL of the verification landing page
    pub public_url: String,
    pub send_quota: DailyQuota,
    pub verify_send_quota: DailyQuota,
    /// Cap on rate limit buckets held in memory
    pub max_buckets: usize,
}

impl RelaySettings {
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();

        Self {
            admin_key: String::new(),
            public_url: format!("https://{}", domain),
            domain,
            send_quota: DailyQuota::new(50),
            verify_send_quota: DailyQuota::new(100),
            max_buckets: DEFAULT_MAX_BUCKETS,
        }
    }

    pub fn with_admin_key(mut self, admin_key: impl Into<String>) -> Self {
        self.admin_key = admin_key.into();
        self
    }

    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = public_url.into();
        self
    }

    pub fn with_quotas(mut self, send_per_day: u32, verify_send_per_day: u32) -> Self {
        self.send_quota = DailyQuota::new(send_per_day);
        self.verify_send_quota = DailyQuota::new(verify_send_per_day);
        self
    }

    pub fn with_max_buckets(mut self, max_buckets: usize) -> Self {
        self.max_buckets = max_buckets;
        self
    }
}

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RelaySettings>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub verification_service: Arc<dyn VerificationServiceTrait>,
    pub mail_gateway: Arc<dyn MailGateway>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(
        settings: RelaySettings,
        user_service: Arc<dyn UserServiceTrait>,
        verification_service: Arc<dyn VerificationServiceTrait>,
        mail_gateway: Arc<dyn MailGateway>,
    ) -> Self {
        let rate_limiter = RateLimiter::new().with_max_buckets(settings.max_buckets);

        Self {
            settings: Arc::new(settings),
            user_service,
            verification_service,
            mail_gateway,
            rate_limiter: Arc::new(rate_limiter),
        }
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn authenticate(&self, api_key: Option<&str>) -> Result<User, DomainError>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn get_or_create(&self, username: &str) -> Result<(User, bool), DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
}

/// Trait for verification service operations
#[async_trait::async_trait]
pub trait VerificationServiceTrait: Send + Sync {
    async fn create_token(&self) -> Result<String, DomainError>;
    async fn check_token(&self, token: &str) -> Result<Option<bool>, DomainError>;
    async fn confirm(&self, token: &str) -> Result<ConfirmOutcome, DomainError>;
    async fn consume(&self, token: &str) -> Result<CheckOutcome, DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<R: UserRepository + 'static> UserServiceTrait for UserService<R> {
    async fn authenticate(&self, api_key: Option<&str>) -> Result<User, DomainError> {
        UserService::authenticate(self, api_key).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        UserService::get_by_username(self, username).await
    }

    async fn get_or_create(&self, username: &str) -> Result<(User, bool), DomainError> {
        UserService::get_or_create(self, username).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        UserService::ping(self).await
    }
}

#[async_trait::async_trait]
impl<R: VerificationRepository + 'static> VerificationServiceTrait for VerificationService<R> {
    async fn create_token(&self) -> Result<String, DomainError> {
        VerificationService::create_token(self).await
    }

    async fn check_token(&self, token: &str) -> Result<Option<bool>, DomainError> {
        VerificationService::check_token(self, token).await
    }

    async fn confirm(&self, token: &str) -> Result<ConfirmOutcome, DomainError> {
        VerificationService::confirm(self, token).await
    }

    async fn consume(&self, token: &str) -> Result<CheckOutcome, DomainError> {
        VerificationService::consume(self, token).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        VerificationService::ping(self).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = RelaySettings::new("mail.example.com");

        assert_eq!(settings.public_url, "https://mail.example.com");
        assert_eq!(settings.send_quota, DailyQuota::new(50));
        assert_eq!(settings.verify_send_quota, DailyQuota::new(100));
        assert!(settings.admin_key.is_empty());
    }

    #[tokio::test]
    async fn test_state_services_are_wired() {
        let (state, _) = test_support::test_state();

        let (user, created) = state.user_service.get_or_create("alice").await.unwrap();
        assert!(created);

        let resolved = state
            .user_service
            .authenticate(Some(user.api_key()))
            .await
            .unwrap();
        assert_eq!(resolved.username(), "alice");

        let token = state.verification_service.create_token().await.unwrap();
        assert_eq!(
            state.verification_service.check_token(&token).await.unwrap(),
            Some(false)
        );
    }
}
