//! Request bodies for the mail endpoints
//!
//! Every field is optional at the parsing stage so that an unauthorized
//! request is always answered with "no key", whatever else it is missing.

use serde::Deserialize;

use super::error::ApiError;
use crate::domain::Recipients;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMailRequest {
    pub key: Option<String>,
    pub to: Option<Recipients>,
    pub subject: Option<String>,
    pub html: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifySendRequest {
    pub key: Option<String>,
    pub to: Option<Recipients>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckRequest {
    pub key: Option<String>,
    pub token: Option<String>,
}

/// Unwrap a field that is required once the caller is authorized
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(format!("missing field `{}`", field)))
}
