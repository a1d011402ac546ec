//! Mail Relay API
//!
//! A multi-tenant email relay:
//! - Usernames registered from an admin page, each bound to an API key
//! - Mail sent through a shared domain as `{username}@{domain}`
//! - Double opt-in verification tokens with an emailed confirmation link
//! - Per-key daily quotas

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AppState, RelaySettings, UserServiceTrait, VerificationServiceTrait};
use infrastructure::{
    mail::MailGatewayFactory,
    storage::{self, StorageType},
    user::{InMemoryUserRepository, PostgresUserRepository, UserService},
    verification::{
        InMemoryVerificationRepository, PostgresVerificationRepository, VerificationService,
    },
};
use tracing::{info, warn};

/// Create the application state with default configuration (in-memory stores, log gateway)
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    let mail_gateway = MailGatewayFactory::create(&config.mail)?;

    let settings = RelaySettings::new(config.mail.domain.clone())
        .with_admin_key(config.admin.key.clone())
        .with_public_url(config.mail.public_url())
        .with_quotas(
            config.rate_limit.send_per_day,
            config.rate_limit.verify_send_per_day,
        )
        .with_max_buckets(config.rate_limit.max_buckets);

    if settings.admin_key.is_empty() {
        warn!("No admin key configured, the admin page is disabled");
    }

    let storage_backend = StorageType::for_url(config.database.url.as_deref());
    info!("Storage backend: {:?}", storage_backend);

    let (user_service, verification_service): (
        Arc<dyn UserServiceTrait>,
        Arc<dyn VerificationServiceTrait>,
    ) = match (storage_backend, config.database.url.as_deref()) {
        (StorageType::Postgres, Some(url)) => {
            let pool = storage::connect(url, config.database.max_connections).await?;
            storage::run_migrations(&pool).await?;

            info!("Using PostgreSQL storage");
            (
                Arc::new(UserService::new(Arc::new(PostgresUserRepository::new(
                    pool.clone(),
                )))),
                Arc::new(VerificationService::new(Arc::new(
                    PostgresVerificationRepository::new(pool),
                ))),
            )
        }
        _ => {
            warn!("No database configured, using in-memory storage");
            (
                Arc::new(UserService::new(Arc::new(InMemoryUserRepository::new()))),
                Arc::new(VerificationService::new(Arc::new(
                    InMemoryVerificationRepository::new(),
                ))),
            )
        }
    };

    info!(
        domain = %settings.domain,
        public_url = %settings.public_url,
        provider = %mail_gateway.name(),
        "Application state initialized"
    );

    Ok(AppState::new(
        settings,
        user_service,
        verification_service,
        mail_gateway,
    ))
}
