use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use sea_orm::DatabaseConnection;
use tower::ServiceExt;

use notifydesk_auth::infra::activity::ActivityHub;
use notifydesk_auth::infra::identity::FirebaseIdentity;
use notifydesk_auth::infra::mail::{EmailJsMailer, EmailJsSettings};
use notifydesk_auth::router::build_router;
use notifydesk_auth::state::AppState;

use crate::helpers::{sender, signer};

/// State whose backends are never reached by the requests below.
fn offline_state() -> AppState {
    let redis = deadpool_redis::Config::from_url("redis://127.0.0.1:1")
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();
    let http = reqwest::Client::new();
    AppState {
        db: DatabaseConnection::Disconnected,
        redis,
        redis_client: deadpool_redis::redis::Client::open("redis://127.0.0.1:1").unwrap(),
        otp: signer(),
        mailer: EmailJsMailer::new(
            http.clone(),
            EmailJsSettings {
                endpoint: "http://127.0.0.1:1/send".to_owned(),
                service_id: "svc".to_owned(),
                template_id: "tpl".to_owned(),
                public_key: "pk".to_owned(),
            },
        ),
        identity: FirebaseIdentity::new(http, "http://127.0.0.1:1/signIn", "key"),
        activity: ActivityHub::new(),
        sender: sender(),
        admin_emails: Arc::new(HashSet::new()),
        idle_timeout: Duration::from_secs(15 * 60),
    }
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn should_answer_liveness_with_request_id() {
    let app = build_router(offline_state());

    let resp = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_reject_session_read_without_headers() {
    let app = build_router(offline_state());

    let resp = app
        .oneshot(Request::builder().uri("/auth/session").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_notification_without_session_headers() {
    let app = build_router(offline_state());

    let resp = app
        .oneshot(post_json(
            "/notifications",
            serde_json::json!({ "toEmail": "a@x.com", "subject": "Hi" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_require_email_for_otp() {
    let app = build_router(offline_state());

    let resp = app
        .oneshot(post_json("/auth/otp", serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(json["kind"], "EMAIL_REQUIRED");
    assert_eq!(json["error"], "Email is required");
}

#[tokio::test]
async fn should_answer_incomplete_verification_with_valid_false() {
    let app = build_router(offline_state());

    let resp = app
        .oneshot(post_json(
            "/auth/otp/verification",
            serde_json::json!({ "email": "user@x.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(json["valid"], false);
    assert_eq!(json["message"], "Email, OTP, and token are required");
}

#[tokio::test]
async fn should_require_both_credentials_before_password_check() {
    let app = build_router(offline_state());

    let resp = app
        .oneshot(post_json(
            "/auth/credentials",
            serde_json::json!({ "email": "user@x.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["kind"], "MISSING_FIELDS");
}
