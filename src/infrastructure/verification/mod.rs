//! Verification infrastructure module
//!
//! Token repositories (in-memory and PostgreSQL), the verification
//! workflow service, and the verification email template.

mod email;
mod postgres_repository;
mod repository;
mod service;

pub use email::{verification_email, verification_link, VERIFICATION_SUBJECT};
pub use postgres_repository::PostgresVerificationRepository;
pub use repository::InMemoryVerificationRepository;
pub use service::VerificationService;
