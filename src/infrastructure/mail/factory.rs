use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::http_client::HttpClient;
use super::{LogMailGateway, MailgunProvider, MailjetProvider};
use crate::config::{MailConfig, MailProviderKind};
use crate::domain::{DomainError, MailGateway};

/// Factory for creating the configured mail gateway
#[derive(Debug)]
pub struct MailGatewayFactory;

impl MailGatewayFactory {
    /// Create a gateway from configuration
    pub fn create(config: &MailConfig) -> Result<Arc<dyn MailGateway>, DomainError> {
        let kind = config.provider_kind();
        info!(provider = ?kind, domain = %config.domain, "Configuring mail gateway");

        match kind {
            MailProviderKind::Log => Ok(Arc::new(LogMailGateway::new())),

            MailProviderKind::Mailgun => {
                let api_key = required(&config.mailgun.api_key, "mail.mailgun.api_key")?;
                let client = Self::http_client(config)?;

                Ok(Arc::new(MailgunProvider::with_base_url(
                    client,
                    api_key,
                    &config.domain,
                    &config.mailgun.api_base,
                )))
            }

            MailProviderKind::Mailjet => {
                let api_key = required(&config.mailjet.api_key, "mail.mailjet.api_key")?;
                let secret_key = required(&config.mailjet.secret_key, "mail.mailjet.secret_key")?;
                let client = Self::http_client(config)?;

                Ok(Arc::new(MailjetProvider::with_base_url(
                    client,
                    api_key,
                    secret_key,
                    &config.mailjet.api_base,
                )))
            }
        }
    }

    fn http_client(config: &MailConfig) -> Result<HttpClient, DomainError> {
        HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, DomainError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::configuration(format!("{} is not set", name)))
}
