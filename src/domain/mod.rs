//! Domain layer - Core business logic and entities

pub mod error;
pub mod mail;
pub mod user;
pub mod verification;

pub use error::DomainError;
pub use mail::{MailGateway, OutgoingMail, ProviderResponse, Recipients};
pub use user::{validate_username, User, UserRepository, UserValidationError};
pub use verification::{CheckOutcome, ConfirmOutcome, VerificationRepository, VerificationToken};
