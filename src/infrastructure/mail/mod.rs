//! Mail provider adapters

mod factory;
pub mod http_client;
mod log;
mod mailgun;
mod mailjet;

pub use factory::MailGatewayFactory;
pub use http_client::{BasicAuth, HttpClient, HttpClientTrait, HttpResponse};
pub use log::LogMailGateway;
pub use mailgun::{MailgunProvider, DEFAULT_MAILGUN_BASE_URL};
pub use mailjet::{MailjetProvider, DEFAULT_MAILJET_BASE_URL};
