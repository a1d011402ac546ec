use async_trait::async_trait;
use tracing::{debug, warn};

use super::http_client::{BasicAuth, HttpClientTrait};
use crate::domain::{DomainError, MailGateway, OutgoingMail, ProviderResponse};

pub const DEFAULT_MAILGUN_BASE_URL: &str = "https://api.mailgun.net";

/// Mailgun messages API
#[derive(Debug)]
pub struct MailgunProvider<C: HttpClientTrait> {
    client: C,
    auth: BasicAuth,
    messages_url: String,
}

impl<C: HttpClientTrait> MailgunProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, domain: &str) -> Self {
        Self::with_base_url(client, api_key, domain, DEFAULT_MAILGUN_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        domain: &str,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth: BasicAuth::new("api", api_key),
            messages_url: format!("{}/v3/{}/messages", base_url, domain),
        }
    }

    fn build_form(mail: &OutgoingMail) -> Vec<(String, String)> {
        let mut form = Vec::with_capacity(mail.to.len() + 3);
        form.push(("from".to_string(), mail.from.clone()));

        for recipient in &mail.to {
            form.push(("to".to_string(), recipient.clone()));
        }

        form.push(("subject".to_string(), mail.subject.clone()));
        form.push(("html".to_string(), mail.html.clone()));
        form
    }
}

#[async_trait]
impl<C: HttpClientTrait> MailGateway for MailgunProvider<C> {
    fn name(&self) -> &str {
        "mailgun"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<ProviderResponse, DomainError> {
        debug!(from = %mail.from, recipients = mail.to.len(), "Sending via Mailgun");

        let response = self
            .client
            .post_form(&self.messages_url, &self.auth, &Self::build_form(mail))
            .await
            .map_err(|e| DomainError::provider("mailgun", e.to_string()))?;

        let result = ProviderResponse::new("mailgun", response.status, response.body);

        if !result.success {
            warn!(status = result.status, "Mailgun rejected message");
        }

        Ok(result)
    }
}
