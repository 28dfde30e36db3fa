// ============================================================================
// Authentication Gate Tests
// ============================================================================
//
// Every authenticated endpoint rejects missing and unknown tokens with 401
// before any handler logic runs, and writes nothing.
//
// ============================================================================

use axum::http::{header, Method, Request, StatusCode};
use axum::body::Body;
use missive_server::metrics::AUTH_FAILURES_TOTAL;
use serde_json::json;

use test_utils::{error_message, spawn_app};

const PROTECTED: &[(&str, &str)] = &[
    ("GET", "/messages"),
    ("POST", "/messages"),
    ("GET", "/messages/sent"),
    ("GET", "/messages/archived"),
    ("PATCH", "/messages/archive"),
    ("GET", "/messages/00000000-0000-0000-0000-000000000000"),
    ("PATCH", "/messages/00000000-0000-0000-0000-000000000000/status"),
    ("GET", "/profile"),
    ("PUT", "/profile"),
    ("PATCH", "/profile"),
    ("POST", "/profile/token"),
    ("GET", "/admin/messages"),
];

fn method(name: &str) -> Method {
    Method::from_bytes(name.as_bytes()).unwrap()
}

#[tokio::test]
async fn missing_token_is_rejected_everywhere() {
    let app = spawn_app();

    for (verb, path) in PROTECTED {
        let response = app.request(method(verb), path, None, Some(json!({}))).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{} {}", verb, path);
        assert_eq!(
            response.body,
            json!({"error": {"message": "Missing Authorization token"}}),
            "{} {}",
            verb,
            path
        );
    }
}

#[tokio::test]
async fn empty_header_counts_as_missing() {
    let app = spawn_app();
    let response = app.request(Method::GET, "/messages", Some(""), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&response.body), "Missing Authorization token");
}

#[tokio::test]
async fn unknown_token_is_rejected_everywhere() {
    let app = spawn_app();
    app.create_user("Mario", "MARI-123").await;

    for (verb, path) in PROTECTED {
        let response = app
            .request(method(verb), path, Some("garbage-value"), Some(json!({})))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{} {}", verb, path);
        assert_eq!(error_message(&response.body), "Invalid token provided");
    }
}

#[tokio::test]
async fn garbage_token_on_profile_has_exact_body() {
    let app = spawn_app();
    let response = app
        .request(Method::GET, "/profile", Some("garbage-value"), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body,
        json!({"error": {"message": "Invalid token provided"}})
    );
}

#[tokio::test]
async fn bearer_prefix_is_not_stripped() {
    let app = spawn_app();
    app.create_user("Mario", "MARI-123").await;

    let response = app
        .request(Method::GET, "/profile", Some("Bearer MARI-123"), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&response.body), "Invalid token provided");
}

#[tokio::test]
async fn non_ascii_header_is_an_invalid_token() {
    let app = spawn_app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/profile")
        .header(header::AUTHORIZATION, &b"tok\xffen"[..])
        .body(Body::empty())
        .unwrap();

    let failures_before = AUTH_FAILURES_TOTAL.get();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&response.body), "Invalid token provided");
    // Other tests may add to the counter concurrently, never subtract.
    assert!(AUTH_FAILURES_TOTAL.get() > failures_before);
}

#[tokio::test]
async fn rejected_create_writes_nothing() {
    let app = spawn_app();
    let receiver = app.create_user("Luigi", "LUIG-456").await;

    let body = json!({"title": "Hi", "content": "Hello", "receiver_email": receiver.email});
    app.request(Method::POST, "/messages", None, Some(body.clone())).await;
    app.request(Method::POST, "/messages", Some("nope"), Some(body)).await;

    assert_eq!(app.store.message_count().await, 0);
}

#[tokio::test]
async fn authentication_runs_before_body_parsing() {
    let app = spawn_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/messages")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_and_metrics_are_public() {
    let app = spawn_app();

    let health = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);

    let metrics = app.request(Method::GET, "/metrics", None, None).await;
    assert_eq!(metrics.status, StatusCode::OK);
    assert!(metrics
        .body
        .as_str()
        .unwrap_or_default()
        .contains("missive_auth_failures_total"));
}
