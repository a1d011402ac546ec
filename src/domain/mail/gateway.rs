//! Mail gateway trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::message::{OutgoingMail, ProviderResponse};
use crate::domain::DomainError;

/// Trait for transactional email providers
///
/// A provider that answers with a non-2xx status is not an error here: the
/// answer comes back as a `ProviderResponse` with `success == false`. `Err`
/// means the provider could not be reached or its answer could not be read.
#[async_trait]
pub trait MailGateway: Send + Sync + Debug {
    /// Provider name used in logs and error messages
    fn name(&self) -> &str;

    /// Send a single message
    async fn send(&self, mail: &OutgoingMail) -> Result<ProviderResponse, DomainError>;
}
