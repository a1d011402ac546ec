use async_trait::async_trait;
use serde_json::json;
use std::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::domain::{DomainError, MailGateway, OutgoingMail, ProviderResponse};

/// Gateway that logs messages instead of delivering them
///
/// Every message is kept in an in-process outbox so local runs and tests can
/// inspect what would have been sent.
#[derive(Debug, Default)]
pub struct LogMailGateway {
    outbox: RwLock<Vec<OutgoingMail>>,
}

impl LogMailGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.outbox
            .read()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MailGateway for LogMailGateway {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<ProviderResponse, DomainError> {
        let id = format!("<{}@log>", Uuid::new_v4());

        info!(
            id = %id,
            from = %mail.from,
            to = ?mail.to,
            subject = %mail.subject,
            "Mail accepted by log gateway"
        );

        self.outbox
            .write()
            .map_err(|_| DomainError::internal("Log gateway outbox lock poisoned"))?
            .push(mail.clone());

        Ok(ProviderResponse::new(
            "log",
            200,
            json!({"id": id, "message": "Queued. Thank you."}),
        ))
    }
}
