use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use foody::api::AppState;
use foody::config::Config;
use foody::services::{Mailer, MailerError};
use foody::state::SharedState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single pooled connection keeps the in-memory database shared.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;
    config
}

async fn spawn_app() -> (Router, Arc<AppState>) {
    let shared = Arc::new(
        SharedState::new(test_config())
            .await
            .expect("Failed to create shared state"),
    );
    let state = foody::api::create_app_state(shared, None);
    (foody::api::router(state.clone()).await, state)
}

/// Mailer whose every send fails, for exercising the registration rollback.
struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, to: &str, _subject: &str, _body: &str) -> Result<(), MailerError> {
        Err(MailerError::InvalidAddress(to.to_string()))
    }
}

fn request(method: &str, uri: &str, api_key: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-Api-Key", key);
    }
    match body {
        Some(json) => builder
            .header("Content-Type", mime::APPLICATION_JSON.as_ref())
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, email: &str, password: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": email, "password": password, "name": "Test User" })),
        ))
        .await
        .unwrap();
    response.status()
}

async fn verify(app: &Router, email: &str, code: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/verify-email",
            None,
            Some(json!({ "email": email, "code": code })),
        ))
        .await
        .unwrap();
    response.status()
}

async fn login(app: &Router, email: &str, password: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        ))
        .await
        .unwrap();
    response.status()
}

#[tokio::test]
async fn test_register_verify_scenario() {
    let (app, state) = spawn_app().await;

    assert_eq!(register(&app, "a@b.com", "sup3rsecret").await, StatusCode::OK);

    let user = state
        .store()
        .get_user_by_email("a@b.com")
        .await
        .unwrap()
        .expect("user should exist");
    assert!(!user.is_active, "account starts inactive");

    let profile = state
        .store()
        .get_profile(user.id)
        .await
        .unwrap()
        .expect("profile should exist");
    assert!(!profile.is_verified);

    let code = profile.verification_code.expect("code should be set");
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let expiry = chrono::DateTime::parse_from_rfc3339(
        profile.code_expiry.as_deref().expect("expiry should be set"),
    )
    .unwrap();
    let minutes_out = (expiry.with_timezone(&chrono::Utc) - chrono::Utc::now()).num_minutes();
    assert!((14..=15).contains(&minutes_out), "expiry ~15 minutes out");

    // Unverified accounts cannot log in, and the rejection is
    // indistinguishable from a wrong password.
    assert_eq!(
        login(&app, "a@b.com", "sup3rsecret").await,
        StatusCode::UNAUTHORIZED
    );

    // Wrong code is rejected without consuming anything.
    let wrong = if code == "000000" { "000001" } else { "000000" };
    assert_eq!(verify(&app, "a@b.com", wrong).await, StatusCode::BAD_REQUEST);

    assert_eq!(verify(&app, "a@b.com", &code).await, StatusCode::OK);

    let user = state
        .store()
        .get_user_by_email("a@b.com")
        .await
        .unwrap()
        .unwrap();
    assert!(user.is_active);

    let profile = state.store().get_profile(user.id).await.unwrap().unwrap();
    assert!(profile.is_verified);
    assert!(profile.verification_code.is_none(), "code cleared after use");
    assert!(profile.code_expiry.is_none(), "expiry cleared with the code");

    assert_eq!(login(&app, "a@b.com", "sup3rsecret").await, StatusCode::OK);
}

#[tokio::test]
async fn test_code_cannot_be_reused() {
    let (app, state) = spawn_app().await;

    register(&app, "once@example.com", "sup3rsecret").await;
    let user = state
        .store()
        .get_user_by_email("once@example.com")
        .await
        .unwrap()
        .unwrap();
    let code = state
        .store()
        .get_profile(user.id)
        .await
        .unwrap()
        .unwrap()
        .verification_code
        .unwrap();

    assert_eq!(verify(&app, "once@example.com", &code).await, StatusCode::OK);
    assert_eq!(
        verify(&app, "once@example.com", &code).await,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_expired_code_rejected() {
    let (app, state) = spawn_app().await;

    register(&app, "late@example.com", "sup3rsecret").await;
    let user = state
        .store()
        .get_user_by_email("late@example.com")
        .await
        .unwrap()
        .unwrap();
    let code = state
        .store()
        .get_profile(user.id)
        .await
        .unwrap()
        .unwrap()
        .verification_code
        .unwrap();

    // Backdate the expiry so the window has passed.
    let past = (chrono::Utc::now() - chrono::Duration::minutes(1)).to_rfc3339();
    state
        .store()
        .set_verification_code(user.id, &code, &past)
        .await
        .unwrap();

    assert_eq!(verify(&app, "late@example.com", &code).await, StatusCode::GONE);
}

#[tokio::test]
async fn test_mail_failure_rolls_back_registration() {
    let shared = Arc::new(
        SharedState::with_mailer(test_config(), Arc::new(FailingMailer))
            .await
            .expect("Failed to create shared state"),
    );
    let state = foody::api::create_app_state(shared, None);
    let app = foody::api::router(state.clone()).await;

    let status = register(&app, "stranded@example.com", "sup3rsecret").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    // The half-created account is gone, so the email can be retried.
    let user = state
        .store()
        .get_user_by_email("stranded@example.com")
        .await
        .unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn test_duplicate_email_conflict() {
    let (app, _state) = spawn_app().await;

    assert_eq!(
        register(&app, "dup@example.com", "sup3rsecret").await,
        StatusCode::OK
    );
    assert_eq!(
        register(&app, "dup@example.com", "0th3rsecret").await,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_short_password_rejected() {
    let (app, _state) = spawn_app().await;

    assert_eq!(
        register(&app, "short@example.com", "short").await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_change_password_contract() {
    let (app, state) = spawn_app().await;

    register(&app, "pw@example.com", "sup3rsecret").await;
    let user = state
        .store()
        .get_user_by_email("pw@example.com")
        .await
        .unwrap()
        .unwrap();
    let code = state
        .store()
        .get_profile(user.id)
        .await
        .unwrap()
        .unwrap()
        .verification_code
        .unwrap();
    verify(&app, "pw@example.com", &code).await;
    let api_key = user.api_key;

    // Wrong current password.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/change-password",
            Some(&api_key),
            Some(json!({
                "old_password": "wr0ngwr0ng",
                "new_password": "n3wsecret1",
                "confirm_password": "n3wsecret1"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Confirmation mismatch.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/change-password",
            Some(&api_key),
            Some(json!({
                "old_password": "sup3rsecret",
                "new_password": "n3wsecret1",
                "confirm_password": "different1"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // New password too short.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/change-password",
            Some(&api_key),
            Some(json!({
                "old_password": "sup3rsecret",
                "new_password": "tiny",
                "confirm_password": "tiny"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Valid change.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/change-password",
            Some(&api_key),
            Some(json!({
                "old_password": "sup3rsecret",
                "new_password": "n3wsecret1",
                "confirm_password": "n3wsecret1"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        login(&app, "pw@example.com", "sup3rsecret").await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login(&app, "pw@example.com", "n3wsecret1").await,
        StatusCode::OK
    );

    // Re-setting the current password is allowed.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/change-password",
            Some(&api_key),
            Some(json!({
                "old_password": "n3wsecret1",
                "new_password": "n3wsecret1",
                "confirm_password": "n3wsecret1"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        login(&app, "pw@example.com", "n3wsecret1").await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_profile_update_and_email_conflict() {
    let (app, state) = spawn_app().await;

    for email in ["one@example.com", "two@example.com"] {
        register(&app, email, "sup3rsecret").await;
        let user = state
            .store()
            .get_user_by_email(email)
            .await
            .unwrap()
            .unwrap();
        let code = state
            .store()
            .get_profile(user.id)
            .await
            .unwrap()
            .unwrap()
            .verification_code
            .unwrap();
        verify(&app, email, &code).await;
    }

    let two = state
        .store()
        .get_user_by_email("two@example.com")
        .await
        .unwrap()
        .unwrap();

    // Taking another account's email is a conflict.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/profile",
            Some(&two.api_key),
            Some(json!({ "email": "one@example.com" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Contact fields update in place.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/profile",
            Some(&two.api_key),
            Some(json!({ "phone": "5551234", "address": "42 Elm Street" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/api/profile", Some(&two.api_key), None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["phone"], "5551234");
    assert_eq!(body["data"]["address"], "42 Elm Street");
    assert_eq!(body["data"]["role"], "customer");
    assert_eq!(body["data"]["is_verified"], true);
}
