//! Request and response types for the JSON API

pub mod error;
pub mod json;
pub mod mail;

pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
pub use mail::{CheckRequest, SendMailRequest, VerifySendRequest};
