//! Integration tests for the HTTP boundary: auth flow, envelope, per-request sessions.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use scaffold_auth::TokenPayload;

#[tokio::test]
async fn test_token_then_me() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice@example.com", "password123");

    let token = app.login("alice@example.com", "password123").await;
    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.code(), 0);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["upn"], "alice@example.com");
    assert_eq!(response.body["data"]["iss"], "scaffold");
    assert_eq!(response.body["data"]["aud"], "scaffold-clients");
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn test_token_response_carries_requested_ttl() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123");

    let response = app
        .request(
            "POST",
            "/api/auth/token",
            Some(json!({ "upn": "alice", "password": "password123", "ttl_seconds": 120 })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["expires_in"], 120);
}

#[tokio::test]
async fn test_token_with_out_of_range_ttl_is_rejected() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123");

    for ttl in [json!(31_536_001u64), json!(u64::MAX), json!(i64::MAX)] {
        let response = app
            .request(
                "POST",
                "/api/auth/token",
                Some(json!({ "upn": "alice", "password": "password123", "ttl_seconds": ttl })),
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "ttl {ttl}");
        assert_eq!(response.code(), 10001);
        assert!(response.body["data"].is_null());
    }
}

#[tokio::test]
async fn test_token_invalid_password() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("bob", "password123");

    let response = app
        .request(
            "POST",
            "/api/auth/token",
            Some(json!({ "upn": "bob", "password": "wrongpassword" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), 10002);
    assert_eq!(response.body["success"], false);
    assert!(response.body["data"].is_null());
}

#[tokio::test]
async fn test_token_nonexistent_user() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/token",
            Some(json!({ "upn": "nobody", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), 10002);
}

#[tokio::test]
async fn test_token_request_validation() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/token",
            Some(json!({ "upn": "", "password": "x" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.code(), 10001);
}

#[tokio::test]
async fn test_me_requires_bearer_token() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), 10002);

    let response = app
        .request("GET", "/api/auth/me", None, Some("not-a-token"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), 10004);
}

#[tokio::test]
async fn test_me_with_expired_token() {
    let app = helpers::TestApp::new().await;
    let issued = app
        .state
        .token_codec
        .create(TokenPayload::new("carol"), Some(Duration::ZERO))
        .unwrap();

    let response = app
        .request("GET", "/api/auth/me", None, Some(&issued.access_token))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.code(), 10003);
}

#[tokio::test]
async fn test_register_is_durable_without_commit_on_exit() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "upn": "dave", "password": "longenough" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["upn"], "dave");
    assert!(app.engine.committed("user:dave").is_some());

    let token = app.login("dave", "longenough").await;
    assert!(!token.is_empty());

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "upn": "dave", "password": "longenough" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.code(), 10007);
}

#[tokio::test]
async fn test_health_uses_a_request_scoped_session() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["engine"], "memory");
    assert!(response.body["data"]["session_id"].is_string());

    let stats = app.engine.stats();
    assert_eq!(stats.opened, 1);
    assert_eq!(stats.closed, 1);
    assert_eq!(stats.rolled_back, 0);
}

#[tokio::test]
async fn test_each_request_gets_its_own_session() {
    let app = helpers::TestApp::new().await;

    let first = app.request("GET", "/api/health", None, None).await;
    let second = app.request("GET", "/api/health", None, None).await;

    assert_ne!(
        first.body["data"]["session_id"],
        second.body["data"]["session_id"]
    );
    assert_eq!(app.engine.stats().open_sessions(), 0);
}

#[tokio::test]
async fn test_error_responses_roll_back_the_request_session() {
    let app = helpers::TestApp::with_commit_on_exit(true).await;

    let response = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.request("GET", "/api/nowhere", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.code(), 10006);

    let stats = app.engine.stats();
    assert_eq!(stats.rolled_back, 2);
    assert_eq!(stats.committed, 0);
    assert_eq!(stats.closed, 2);
}

#[tokio::test]
async fn test_successful_requests_commit_when_configured() {
    let app = helpers::TestApp::with_commit_on_exit(true).await;

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);

    let stats = app.engine.stats();
    assert_eq!(stats.committed, 1);
    assert_eq!(stats.rolled_back, 0);
}
