//! JSON mail endpoints
//!
//! Order of checks on every sending endpoint: quota, then key, then the
//! remaining fields. Nothing is created or sent before the key is resolved.

use axum::extract::State;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use super::middleware::{authorize, enforce_quota};
use super::state::AppState;
use super::types::mail::required;
use super::types::{ApiError, CheckRequest, Json, SendMailRequest, VerifySendRequest};
use crate::domain::verification::CheckOutcome;
use crate::domain::{OutgoingMail, ProviderResponse};
use crate::infrastructure::api_key::key_prefix;
use crate::infrastructure::verification::{verification_email, verification_link};

pub const SEND_ENDPOINT: &str = "/api/mail/send";
pub const VERIFY_SEND_ENDPOINT: &str = "/api/mail/verify/send";
pub const VERIFY_CHECK_ENDPOINT: &str = "/api/mail/verify/check";

/// POST /api/mail/send
pub async fn send_mail(
    State(state): State<AppState>,
    Json(request): Json<SendMailRequest>,
) -> Result<Json<Value>, ApiError> {
    let key = request.key.as_deref();
    enforce_quota(&state, SEND_ENDPOINT, key, &state.settings.send_quota).await?;
    let user = authorize(&state, key).await?;

    let to = required(request.to, "to")?;
    let subject = required(request.subject, "subject")?;
    let html = required(request.html, "html")?;

    let mail = OutgoingMail::new(
        user.sender_address(&state.settings.domain),
        to,
        subject,
        html,
    )?;

    let response = dispatch(&state, &mail).await?;

    info!(
        user_id = user.id(),
        recipients = mail.to.len(),
        provider = %response.provider,
        "Mail sent"
    );

    Ok(Json(success_body(response.body, Map::new())))
}

/// POST /api/mail/verify/send
pub async fn send_verification(
    State(state): State<AppState>,
    Json(request): Json<VerifySendRequest>,
) -> Result<Json<Value>, ApiError> {
    let key = request.key.as_deref();
    enforce_quota(&state, VERIFY_SEND_ENDPOINT, key, &state.settings.verify_send_quota).await?;
    let user = authorize(&state, key).await?;

    let to = required(request.to, "to")?;
    if to.normalize().is_empty() {
        return Err(ApiError::bad_request("At least one recipient is required"));
    }

    let token = state.verification_service.create_token().await?;
    let link = verification_link(&state.settings.public_url, &token);
    let mail = verification_email(
        user.verification_sender_address(&state.settings.domain),
        to,
        &link,
    )?;

    // A token whose mail was refused stays in the store unconfirmed
    let response = dispatch(&state, &mail).await?;

    info!(
        user_id = user.id(),
        token_prefix = %key_prefix(&token),
        provider = %response.provider,
        "Verification mail sent"
    );

    let mut extra = Map::new();
    extra.insert("token".to_string(), Value::String(token));

    Ok(Json(success_body(response.body, extra)))
}

/// POST /api/mail/verify/check
pub async fn check_verification(
    State(state): State<AppState>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = authorize(&state, request.key.as_deref()).await?;
    let token = required(request.token, "token")?;

    match state.verification_service.consume(&token).await? {
        CheckOutcome::NotFound => {
            warn!(
                user_id = user.id(),
                token_prefix = %key_prefix(&token),
                "Check for unknown verification token"
            );
            Err(ApiError::not_found("invalid token"))
        }
        outcome => Ok(Json(json!({
            "ok": true,
            "verified": outcome.verified(),
        }))),
    }
}

/// Hand a message to the gateway; refusals become 502 with the raw body
async fn dispatch(state: &AppState, mail: &OutgoingMail) -> Result<ProviderResponse, ApiError> {
    let response = state.mail_gateway.send(mail).await.map_err(|e| {
        error!(provider = %state.mail_gateway.name(), error = %e, "Mail provider unreachable");
        ApiError::from(e)
    })?;

    if !response.success {
        error!(
            provider = %response.provider,
            status = response.status,
            "Mail provider rejected message"
        );

        let error = if response.body.is_null() {
            Value::String(response.error_message())
        } else {
            response.body
        };

        return Err(ApiError::bad_gateway(error));
    }

    Ok(response)
}

/// `{"ok": true}` merged with the provider's answer and `extra`
fn success_body(provider_body: Value, extra: Map<String, Value>) -> Value {
    let mut body = match provider_body {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("response".to_string(), other);
            map
        }
    };

    body.extend(extra);
    body.insert("ok".to_string(), Value::Bool(true));

    Value::Object(body)
}
