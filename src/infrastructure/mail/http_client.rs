use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::domain::DomainError;

/// Basic auth credentials for a provider request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Status and decoded body of a provider answer
///
/// Bodies that are not JSON are kept as a JSON string; an empty body is null.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Trait for HTTP client operations (for mocking)
///
/// Non-2xx answers are returned, not turned into errors.
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_form(
        &self,
        url: &str,
        auth: &BasicAuth,
        form: &[(String, String)],
    ) -> Result<HttpResponse, DomainError>;

    async fn post_json(
        &self,
        url: &str,
        auth: &BasicAuth,
        body: &Value,
    ) -> Result<HttpResponse, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn read_response(response: reqwest::Response) -> Result<HttpResponse, DomainError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to read response: {}", e)))?;

        Ok(HttpResponse::new(status, decode_body(&text)))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }

    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.trim().to_string()))
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_form(
        &self,
        url: &str,
        auth: &BasicAuth,
        form: &[(String, String)],
    ) -> Result<HttpResponse, DomainError> {
        let response = self
            .client
            .post(url)
            .basic_auth(&auth.username, Some(&auth.password))
            .form(form)
            .send()
            .await
            .map_err(|e| DomainError::provider("http", format!("Request failed: {}", e)))?;

        Self::read_response(response).await
    }

    async fn post_json(
        &self,
        url: &str,
        auth: &BasicAuth,
        body: &Value,
    ) -> Result<HttpResponse, DomainError> {
        let response = self
            .client
            .post(url)
            .basic_auth(&auth.username, Some(&auth.password))
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::provider("http", format!("Request failed: {}", e)))?;

        Self::read_response(response).await
    }
}
