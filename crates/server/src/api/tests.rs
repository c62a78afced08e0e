//! Router-level tests for the note gateway, driven with `oneshot` against the
//! in-memory secret provider and queue.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt as _;

use notebox_queue::MemoryQueue;
use notebox_secrets::{CredentialRecord, MemorySecretProvider};

use crate::router::build_router;
use crate::state::AppState;

const SECRET_ID: &str = "notes/auth";
const VALID_AUTH: &str = "Basic YWRtaW46czNjcmV0"; // admin:s3cret

struct Harness {
    secrets: Arc<MemorySecretProvider>,
    queue: Arc<MemoryQueue>,
    router: Router,
}

fn harness() -> Harness {
    let secrets = Arc::new(MemorySecretProvider::with_record(
        SECRET_ID,
        &CredentialRecord::new("admin", "s3cret"),
    ));
    let queue = Arc::new(MemoryQueue::new());
    let state = Arc::new(AppState::new(secrets.clone(), SECRET_ID, queue.clone()));
    Harness {
        secrets,
        queue,
        router: build_router(state, "*"),
    }
}

impl Harness {
    async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn issue_token(&self) -> (StatusCode, Value) {
        self.call(get("/auth-token", None)).await
    }

    async fn submit(&self, auth: Option<&str>, body: &str) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/notes")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        self.call(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn list(&self, auth: Option<&str>) -> (StatusCode, Value) {
        self.call(get("/notes", auth)).await
    }
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

// ── IssueToken ───────────────────────────────────────────────────

#[tokio::test]
async fn test_issue_token() {
    let h = harness();
    let (status, body) = h.issue_token().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"], VALID_AUTH);
    assert!(body["message"].as_str().unwrap().contains("Successfully authenticated"));
}

#[tokio::test]
async fn test_issue_token_deterministic_and_follows_rotation() {
    let h = harness();
    let (_, first) = h.issue_token().await;
    let (_, second) = h.issue_token().await;
    assert_eq!(first["token"], second["token"]);

    h.secrets
        .rotate(SECRET_ID, &CredentialRecord::new("admin", "rotated"));
    let (_, third) = h.issue_token().await;
    assert_ne!(first["token"], third["token"]);
}

#[tokio::test]
async fn test_issued_token_is_accepted_by_notes() {
    let h = harness();
    let (_, body) = h.issue_token().await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = h.list(Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_issue_token_rejects_post() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/auth-token")
        .body(Body::empty())
        .unwrap();
    let (status, body) = h.call(request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(body["error"].as_str().unwrap().contains("POST"));
    assert_eq!(h.secrets.calls(), 0);
}

#[tokio::test]
async fn test_issue_token_rejects_head() {
    let h = harness();
    let request = Request::builder()
        .method("HEAD")
        .uri("/auth-token")
        .body(Body::empty())
        .unwrap();
    let (status, _) = h.call(request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(h.secrets.calls(), 0);
}

#[tokio::test]
async fn test_issue_token_secret_unavailable() {
    let h = harness();
    h.secrets.fail_lookups(true);
    let (status, body) = h.issue_token().await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.get("token").is_none());
    assert!(body["error"].is_string());
}

// ── SubmitNote ───────────────────────────────────────────────────

#[tokio::test]
async fn test_submit_note() {
    let h = harness();
    let (status, body) = h.submit(Some(VALID_AUTH), r#"{"note":"hello"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Note sent to the Queue successfully");
    assert_eq!(body["note"]["Message"], "hello");
    assert!(!body["note"]["MessageId"].as_str().unwrap().is_empty());
    assert_eq!(
        body["note"]["MD5OfMessageBody"],
        "5d41402abc4b2a76b9719d911017c592"
    );
    assert_eq!(h.queue.len(), 1);
}

#[tokio::test]
async fn test_submit_missing_auth_never_touches_queue() {
    let h = harness();
    let (status, body) = h.submit(None, r#"{"note":"hello"}"#).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authorization token required.");
    assert_eq!(h.queue.send_calls(), 0);
    assert_eq!(h.secrets.calls(), 0);
}

#[tokio::test]
async fn test_submit_invalid_credentials_never_touches_queue() {
    let h = harness();
    // admin:wrong
    let (status, _) = h
        .submit(Some("Basic YWRtaW46d3Jvbmc="), r#"{"note":"hello"}"#)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(h.queue.send_calls(), 0);
}

#[tokio::test]
async fn test_submit_malformed_auth() {
    let h = harness();
    let (status, _) = h.submit(Some("Basic"), r#"{"note":"hello"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.queue.send_calls(), 0);
}

#[tokio::test]
async fn test_submit_auth_checked_before_body() {
    let h = harness();
    let (status, _) = h.submit(None, "not json").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_submit_bad_body_never_touches_queue() {
    let h = harness();
    for body in ["not json", "{}", r#"{"text":"hello"}"#] {
        let (status, resp) = h.submit(Some(VALID_AUTH), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert!(resp["error"].as_str().unwrap().starts_with("Bad request"));
    }
    assert_eq!(h.queue.send_calls(), 0);
}

#[tokio::test]
async fn test_submit_control_characters_rejected_before_queue() {
    let h = harness();
    let (status, body) = h.submit(Some(VALID_AUTH), r#"{"note":"\u0000"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("U+0000"));
    assert_eq!(h.queue.send_calls(), 0);
}

#[tokio::test]
async fn test_submit_queue_failure_is_unavailable() {
    let h = harness();
    h.queue.fail_sends(true);
    let (status, body) = h.submit(Some(VALID_AUTH), r#"{"note":"hello"}"#).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.get("note").is_none());
    assert!(body.get("message").is_none());
    assert_eq!(body["error"], "Note queue unavailable");
    assert_eq!(h.queue.send_calls(), 1);
}

#[tokio::test]
async fn test_submit_secret_unavailable() {
    let h = harness();
    h.secrets.put(SECRET_ID, r#"{"username":"admin"}"#);
    let (status, _) = h.submit(Some(VALID_AUTH), r#"{"note":"hello"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(h.queue.send_calls(), 0);
}

// ── ListNotes ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_empty_queue() {
    let h = harness();
    let (status, body) = h.list(Some(VALID_AUTH)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Messages"], serde_json::json!([]));
}

#[tokio::test]
async fn test_list_returns_submitted_notes() {
    let h = harness();
    for note in ["first", "second"] {
        let body = serde_json::json!({ "note": note }).to_string();
        h.submit(Some(VALID_AUTH), &body).await;
    }

    let (status, body) = h.list(Some(VALID_AUTH)).await;
    assert_eq!(status, StatusCode::OK);

    let messages = body["Messages"].as_array().unwrap();
    let mut bodies: Vec<&str> = messages.iter().map(|m| m["Body"].as_str().unwrap()).collect();
    bodies.sort();
    assert_eq!(bodies, ["first", "second"]);
    for m in messages {
        assert!(m["MessageId"].is_string());
        assert!(m["ReceiptHandle"].is_string());
        assert!(m["MD5OfBody"].is_string());
    }
}

#[tokio::test]
async fn test_list_caps_at_ten() {
    let h = harness();
    for i in 0..12 {
        let body = serde_json::json!({ "note": format!("note {i}") }).to_string();
        h.submit(Some(VALID_AUTH), &body).await;
    }

    let (_, body) = h.list(Some(VALID_AUTH)).await;
    assert_eq!(body["Messages"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_list_missing_auth_never_touches_queue() {
    let h = harness();
    let (status, _) = h.list(None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(h.queue.receive_calls(), 0);
}

#[tokio::test]
async fn test_list_queue_failure_is_unavailable() {
    let h = harness();
    h.queue.fail_receives(true);
    let (status, body) = h.list(Some(VALID_AUTH)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.get("Messages").is_none());
}

#[tokio::test]
async fn test_list_rejects_head_without_receiving() {
    let h = harness();
    h.submit(Some(VALID_AUTH), r#"{"note":"hello"}"#).await;

    let request = Request::builder()
        .method("HEAD")
        .uri("/notes")
        .header(header::AUTHORIZATION, VALID_AUTH)
        .body(Body::empty())
        .unwrap();
    let (status, _) = h.call(request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(h.queue.receive_calls(), 0);

    // The note is still visible to the next GET.
    let (_, body) = h.list(Some(VALID_AUTH)).await;
    assert_eq!(body["Messages"][0]["Body"], "hello");
}

#[tokio::test]
async fn test_non_ascii_authorization_is_malformed() {
    let h = harness();
    let request = Request::builder()
        .method("GET")
        .uri("/notes")
        .header(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Basic \xe9t\xe9").unwrap(),
        )
        .body(Body::empty())
        .unwrap();
    let (status, body) = h.call(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Malformed authorization header"));
    assert_eq!(h.secrets.calls(), 0);
    assert_eq!(h.queue.receive_calls(), 0);
}

#[tokio::test]
async fn test_unauthorized_response_has_challenge() {
    let h = harness();
    let response = h.router.clone().oneshot(get("/notes", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn test_notes_rejects_other_methods() {
    let h = harness();
    let request = Request::builder()
        .method("DELETE")
        .uri("/notes")
        .header(header::AUTHORIZATION, VALID_AUTH)
        .body(Body::empty())
        .unwrap();
    let (status, body) = h.call(request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(body["error"].as_str().unwrap().contains("/notes"));
    assert_eq!(h.queue.send_calls() + h.queue.receive_calls(), 0);
}

// ── Health ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reports_queue() {
    let h = harness();
    h.submit(Some(VALID_AUTH), r#"{"note":"hello"}"#).await;

    let (status, body) = h.call(get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["queue"]["provider"], "memory");
    assert_eq!(body["queue"]["approximate_message_count"], 1);
    assert_eq!(h.secrets.calls(), 1);
}

#[tokio::test]
async fn test_health_rejects_other_methods() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = h.call(request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(body["error"].as_str().unwrap().contains("/health"));
}
