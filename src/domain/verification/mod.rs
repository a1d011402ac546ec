//! Email verification domain
//!
//! One-time tokens for the double opt-in flow.

mod entity;
mod repository;

pub use entity::{CheckOutcome, ConfirmOutcome, VerificationToken};
pub use repository::VerificationRepository;
