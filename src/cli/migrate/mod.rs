//! Migrate command - creates the relay schema and exits

use anyhow::Context;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::{logging, storage};

/// Apply pending migrations to the configured database
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let url = config
        .database
        .url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .context("database.url (or DB_URI) must be set to run migrations")?;

    let pool = storage::connect(url, config.database.max_connections).await?;
    storage::run_migrations(&pool).await?;

    info!("Migrations complete");

    Ok(())
}
