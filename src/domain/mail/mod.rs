//! Mail domain
//!
//! Provider-agnostic message types and the gateway trait.

mod gateway;
mod message;
mod recipients;

pub use gateway::MailGateway;
pub use message::{OutgoingMail, ProviderResponse};
pub use recipients::Recipients;

#[cfg(test)]
pub use gateway::mock::MockMailGateway;
