//! Outgoing message and provider result types

use serde::Serialize;
use serde_json::Value;

use super::recipients::Recipients;
use crate::domain::DomainError;

/// A message ready to hand to a mail provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

impl OutgoingMail {
    /// Build a message, normalizing the recipients
    pub fn new(
        from: impl Into<String>,
        to: Recipients,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            from: from.into(),
            to: to.into_list()?,
            subject: subject.into(),
            html: html.into(),
        })
    }
}

/// What the provider answered, passed through without interpretation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderResponse {
    pub provider: String,
    pub status: u16,
    pub success: bool,
    pub body: Value,
}

impl ProviderResponse {
    pub fn new(provider: impl Into<String>, status: u16, body: Value) -> Self {
        Self {
            provider: provider.into(),
            status,
            success: (200..300).contains(&status),
            body,
        }
    }

    /// Human-readable error text for a failed send
    pub fn error_message(&self) -> String {
        match &self.body {
            Value::String(s) => s.clone(),
            Value::Null => format!("{} returned HTTP {}", self.provider, self.status),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outgoing_mail_normalizes_recipients() {
        let mail = OutgoingMail::new(
            "alice@mail.example.com",
            Recipients::from("a@x.com;b@y.com"),
            "Hi",
            "<p>Hi</p>",
        )
        .unwrap();

        assert_eq!(mail.to, vec!["a@x.com", "b@y.com"]);
    }

    #[test]
    fn test_outgoing_mail_requires_recipient() {
        let result = OutgoingMail::new("a@b.c", Recipients::from(""), "s", "h");
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_provider_response_success_flag() {
        assert!(ProviderResponse::new("mailgun", 200, Value::Null).success);
        assert!(!ProviderResponse::new("mailgun", 400, Value::Null).success);
        assert!(!ProviderResponse::new("mailgun", 500, Value::Null).success);
    }

    #[test]
    fn test_provider_error_message() {
        let text = ProviderResponse::new("mailgun", 401, json!("Forbidden"));
        assert_eq!(text.error_message(), "Forbidden");

        let object = ProviderResponse::new("mailgun", 400, json!({"message": "bad"}));
        assert_eq!(object.error_message(), r#"{"message":"bad"}"#);

        let empty = ProviderResponse::new("mailjet", 503, Value::Null);
        assert_eq!(empty.error_message(), "mailjet returned HTTP 503");
    }
}
