use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::http_client::{BasicAuth, HttpClientTrait};
use crate::domain::{DomainError, MailGateway, OutgoingMail, ProviderResponse};

pub const DEFAULT_MAILJET_BASE_URL: &str = "https://api.mailjet.com";

/// Mailjet Send API v3.1
#[derive(Debug)]
pub struct MailjetProvider<C: HttpClientTrait> {
    client: C,
    auth: BasicAuth,
    send_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MailjetRequest<'a> {
    messages: Vec<MailjetMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MailjetMessage<'a> {
    from: MailjetAddress<'a>,
    to: Vec<MailjetAddress<'a>>,
    subject: &'a str,
    #[serde(rename = "HTMLPart")]
    html_part: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MailjetAddress<'a> {
    email: &'a str,
}

impl<C: HttpClientTrait> MailjetProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, secret_key, DEFAULT_MAILJET_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth: BasicAuth::new(api_key, secret_key),
            send_url: format!("{}/v3.1/send", base_url),
        }
    }

    fn build_request(mail: &OutgoingMail) -> Result<serde_json::Value, DomainError> {
        let request = MailjetRequest {
            messages: vec![MailjetMessage {
                from: MailjetAddress { email: &mail.from },
                to: mail
                    .to
                    .iter()
                    .map(|email| MailjetAddress { email })
                    .collect(),
                subject: &mail.subject,
                html_part: &mail.html,
            }],
        };

        serde_json::to_value(&request)
            .map_err(|e| DomainError::internal(format!("Failed to encode Mailjet request: {}", e)))
    }
}

#[async_trait]
impl<C: HttpClientTrait> MailGateway for MailjetProvider<C> {
    fn name(&self) -> &str {
        "mailjet"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<ProviderResponse, DomainError> {
        debug!(from = %mail.from, recipients = mail.to.len(), "Sending via Mailjet");

        let body = Self::build_request(mail)?;
        let response = self
            .client
            .post_json(&self.send_url, &self.auth, &body)
            .await
            .map_err(|e| DomainError::provider("mailjet", e.to_string()))?;

        let result = ProviderResponse::new("mailjet", response.status, response.body);

        if !result.success {
            warn!(status = result.status, "Mailjet rejected message");
        }

        Ok(result)
    }
}
