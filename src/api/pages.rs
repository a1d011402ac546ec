//! HTML pages: the admin sign-in page and the verification landing page
//!
//! Failures on these routes are plain-text `err: ...` bodies.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::state::AppState;
use crate::domain::user::User;
use crate::domain::verification::ConfirmOutcome;
use crate::domain::DomainError;
use crate::infrastructure::api_key::constant_time_compare;

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub key: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
    pub clicked: Option<String>,
}

fn page_error(status: StatusCode, message: &str) -> Response {
    (status, format!("err: {}", message)).into_response()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// GET / - sign-in form, or the user page for an admin-authenticated request
pub async fn admin_page(State(state): State<AppState>, Query(query): Query<AdminQuery>) -> Response {
    let Some(key) = query.key.as_deref() else {
        return Html(sign_in_page()).into_response();
    };

    let admin_key = state.settings.admin_key.as_str();

    if admin_key.is_empty() || !constant_time_compare(key, admin_key) {
        warn!("Admin page request with invalid key");
        return page_error(StatusCode::UNAUTHORIZED, "invalid admin key");
    }

    let Some(username) = non_empty(&query.username) else {
        return page_error(StatusCode::BAD_REQUEST, "no username provided");
    };

    match state.user_service.get_or_create(username).await {
        Ok((user, created)) => {
            if created {
                info!(username = %user.username(), "User registered from admin page");
            }
            Html(user_page(&user, &state.settings.domain)).into_response()
        }
        Err(DomainError::Validation { message }) => page_error(StatusCode::BAD_REQUEST, &message),
        Err(e) => {
            error!(error = %e, "Failed to load user for admin page");
            page_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

/// GET /mail/verify - confirmation prompt, then the confirmed click
pub async fn verify_page(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    let Some(token) = non_empty(&query.token) else {
        return page_error(StatusCode::NOT_FOUND, "invalid token");
    };

    let service = &state.verification_service;

    if non_empty(&query.clicked).is_some() {
        return match service.confirm(token).await {
            Ok(ConfirmOutcome::Confirmed) => Html(closed_page()).into_response(),
            Ok(ConfirmOutcome::AlreadyVerified) => Html(already_verified_page()).into_response(),
            Ok(ConfirmOutcome::NotFound) => page_error(StatusCode::NOT_FOUND, "invalid token"),
            Err(e) => {
                error!(error = %e, "Failed to confirm verification token");
                page_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        };
    }

    match service.check_token(token).await {
        Ok(Some(false)) => Html(prompt_page(token)).into_response(),
        Ok(Some(true)) => Html(already_verified_page()).into_response(),
        Ok(None) => page_error(StatusCode::NOT_FOUND, "invalid token"),
        Err(e) => {
            error!(error = %e, "Failed to look up verification token");
            page_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
</head>
<body>
{}
</body>
</html>
"#,
        encode_text(title),
        body
    )
}

fn sign_in_page() -> String {
    layout(
        "Mail relay",
        r#"<h1>Mail relay</h1>
<form method="get" action="/">
<label>Admin key <input type="password" name="key"></label>
<label>Username <input type="text" name="username"></label>
<button type="submit">Sign in</button>
</form>"#,
    )
}

fn user_page(user: &User, domain: &str) -> String {
    let body = format!(
        r#"<h1>{username}</h1>
<dl>
<dt>Sender address</dt><dd><code>{sender}</code></dd>
<dt>Verification sender</dt><dd><code>{verify_sender}</code></dd>
<dt>API key</dt><dd><code>{api_key}</code></dd>
</dl>
<p>Send with <code>POST /api/mail/send</code> and a JSON body containing
<code>key</code>, <code>to</code>, <code>subject</code> and <code>html</code>.</p>"#,
        username = encode_text(user.username()),
        sender = encode_text(&user.sender_address(domain)),
        verify_sender = encode_text(&user.verification_sender_address(domain)),
        api_key = encode_text(user.api_key()),
    );

    layout(user.username(), &body)
}

fn prompt_page(token: &str) -> String {
    let href = format!("/mail/verify?token={}&clicked=1", urlencoding::encode(token));
    let body = format!(
        r#"<h1>Verify your email address</h1>
<p><a href="{}">Click here to confirm</a></p>"#,
        encode_double_quoted_attribute(&href)
    );

    layout("Verify your email address", &body)
}

fn closed_page() -> String {
    layout(
        "Email verified",
        "<h1>Email verified</h1>\n<p>You can close this page.</p>",
    )
}

fn already_verified_page() -> String {
    layout(
        "Already verified",
        "<h1>Already verified</h1>\n<p>This address has already been confirmed.</p>",
    )
}
