use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::mail;
use super::middleware::logging_middleware;
use super::pages;
use super::state::AppState;

/// JSON mail API, open to any origin
pub fn create_mail_router() -> Router<AppState> {
    Router::new()
        .route(mail::SEND_ENDPOINT, post(mail::send_mail))
        .route(mail::VERIFY_SEND_ENDPOINT, post(mail::send_verification))
        .route(mail::VERIFY_CHECK_ENDPOINT, post(mail::check_verification))
        .layer(CorsLayer::permissive())
}

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // HTML pages
        .route("/", get(pages::admin_page))
        .route("/mail/verify", get(pages::verify_page))
        .merge(create_mail_router())
        // Add state and middleware
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
