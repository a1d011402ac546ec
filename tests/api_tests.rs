use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use mail_relay::api::{AppState, RelaySettings, create_router};
use mail_relay::config::AppConfig;
use mail_relay::infrastructure::mail::LogMailGateway;
use mail_relay::infrastructure::user::{InMemoryUserRepository, UserService};
use mail_relay::infrastructure::verification::{
    InMemoryVerificationRepository, VerificationService,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN_KEY: &str = "test-admin-key";
const DOMAIN: &str = "mail.example.com";

struct TestApp {
    router: Router,
    state: AppState,
    outbox: Arc<LogMailGateway>,
    tokens: Arc<InMemoryVerificationRepository>,
}

fn spawn_app() -> TestApp {
    let outbox = Arc::new(LogMailGateway::new());
    let tokens = Arc::new(InMemoryVerificationRepository::new());

    let state = AppState::new(
        RelaySettings::new(DOMAIN).with_admin_key(ADMIN_KEY),
        Arc::new(UserService::new(Arc::new(InMemoryUserRepository::new()))),
        Arc::new(VerificationService::new(tokens.clone())),
        outbox.clone(),
    );

    TestApp {
        router: create_router(state.clone()),
        state,
        outbox,
        tokens,
    }
}

impl TestApp {
    async fn register(&self, username: &str) -> String {
        let response = self
            .get(&format!("/?key={}&username={}", ADMIN_KEY, username))
            .await;
        assert_eq!(response.0, StatusCode::OK);

        let user = self
            .state
            .user_service
            .get_by_username(username)
            .await
            .unwrap()
            .unwrap();

        assert!(response.1.contains(user.api_key()));
        user.api_key().to_string()
    }

    async fn get(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, body.to_string()).await
    }

    async fn post_raw(&self, uri: &str, body: String) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }
}

#[tokio::test]
async fn test_double_opt_in_scenario() {
    let app = spawn_app();
    let key = app.register("alice").await;

    let (status, body) = app
        .post(
            "/api/mail/verify/send",
            json!({"key": key, "to": "bob@example.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let token = body["token"].as_str().unwrap().to_string();

    let sent = app.outbox.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, "verify.alice@mail.example.com");
    assert_eq!(sent[0].to, vec!["bob@example.com"]);
    assert!(sent[0].html.contains(&format!(
        "https://mail.example.com/mail/verify?token={}",
        token
    )));

    let (status, page) = app.get(&format!("/mail/verify?token={}", token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("clicked=1"));

    let (status, body) = app
        .post("/api/mail/verify/check", json!({"key": key, "token": token}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "verified": false}));

    let (status, page) = app
        .get(&format!("/mail/verify?token={}&clicked=1", token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Email verified"));

    let (_, page) = app
        .get(&format!("/mail/verify?token={}&clicked=1", token))
        .await;
    assert!(page.contains("Already verified"));

    let (status, body) = app
        .post("/api/mail/verify/check", json!({"key": key, "token": token}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "verified": true}));

    let (status, body) = app
        .post("/api/mail/verify/check", json!({"key": key, "token": token}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["ok"], false);
    assert!(app.tokens.is_empty().await);
}

#[tokio::test]
async fn test_unauthorized_requests_have_no_side_effects() {
    let app = spawn_app();
    app.register("alice").await;

    let requests = [
        (
            "/api/mail/send",
            json!({"key": "mk_wrong", "to": "a@x.com", "subject": "s", "html": "h"}),
        ),
        ("/api/mail/send", json!({"to": "a@x.com", "subject": "s", "html": "h"})),
        ("/api/mail/verify/send", json!({"key": "mk_wrong", "to": "a@x.com"})),
        ("/api/mail/verify/send", json!({"key": "", "to": "a@x.com"})),
        ("/api/mail/verify/check", json!({"key": "mk_wrong", "token": "t"})),
        ("/api/mail/verify/check", json!({})),
    ];

    for (uri, body) in requests {
        let (status, body) = app.post(uri, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body, json!({"ok": false, "error": "no key"}));
    }

    assert!(app.outbox.sent().is_empty());
    assert!(app.tokens.is_empty().await);
}

#[tokio::test]
async fn test_recipient_shapes_are_equivalent() {
    let app = spawn_app();
    let key = app.register("alice").await;

    for to in [json!("a@x.com; b@y.com"), json!(["a@x.com", "b@y.com"])] {
        let (status, body) = app
            .post(
                "/api/mail/send",
                json!({"key": key, "to": to, "subject": "Hi", "html": "<p>Hi</p>"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    let sent = app.outbox.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, sent[1].to);
    assert_eq!(sent[0].to, vec!["a@x.com", "b@y.com"]);
    assert_eq!(sent[0].from, "alice@mail.example.com");
}

async fn send_one(app: &TestApp, key: &str) -> (StatusCode, Value) {
    app.post(
        "/api/mail/send",
        json!({"key": key, "to": "a@x.com", "subject": "Hi", "html": "Hi"}),
    )
    .await
}

#[tokio::test]
async fn test_send_quota_is_per_key() {
    let app = spawn_app();
    let alice = app.register("alice").await;
    let carol = app.register("carol").await;

    for _ in 0..50 {
        let (status, _) = send_one(&app, &alice).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send_one(&app, &alice).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().starts_with("rate limit exceeded"));

    let (status, _) = send_one(&app, &carol).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.outbox.sent().len(), 51);
}

#[tokio::test]
async fn test_malformed_and_incomplete_bodies() {
    let app = spawn_app();
    let key = app.register("alice").await;

    let (status, body) = app.post_raw("/api/mail/send", "{oops".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);

    let (status, body) = app
        .post("/api/mail/send", json!({"key": key, "to": "a@x.com"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing field `subject`");

    let (status, _) = app
        .post("/api/mail/verify/check", json!({"key": key}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(app.outbox.sent().is_empty());
}

#[tokio::test]
async fn test_admin_page() {
    let app = spawn_app();

    let (status, page) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<form"));

    let (status, text) = app.get("/?key=wrong&username=alice").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(text, "err: invalid admin key");

    let (status, text) = app.get(&format!("/?key={}", ADMIN_KEY)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "err: no username provided");

    let first = app.register("alice").await;
    let second = app.register("alice").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_verify_page_rejects_unknown_token() {
    let app = spawn_app();

    for uri in ["/mail/verify", "/mail/verify?token=nope", "/mail/verify?token=nope&clicked=1"] {
        let (status, text) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(text, "err: invalid token");
    }
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = spawn_app();

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"healthy\""));

    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("user_store"));

    let (status, _) = app.get("/live").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight_on_mail_api() {
    let app = spawn_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/mail/send")
                .header(header::ORIGIN, "https://client.example.org")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert!(
        response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}

#[tokio::test]
async fn test_state_from_default_config() {
    let mut config = AppConfig::default();
    config.admin.key = ADMIN_KEY.to_string();
    config.mail.domain = DOMAIN.to_string();

    let state = mail_relay::create_app_state_with_config(&config)
        .await
        .unwrap();
    assert_eq!(state.mail_gateway.name(), "log");
    assert_eq!(state.settings.public_url, "https://mail.example.com");

    let router = create_router(state);
    let response = router
        .oneshot(
            Request::builder()
                .uri(format!("/?key={}&username=alice", ADMIN_KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
