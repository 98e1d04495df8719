//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use scaffold_api::AppState;
use scaffold_auth::PasswordHasher;
use scaffold_core::config::AppConfig;
use scaffold_database::{CredentialRepository, MemoryEngine, RegistryOptions, SessionRegistry};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Engine behind the app's sessions, for direct inspection
    pub engine: MemoryEngine,
    /// Application state
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application over a fresh memory engine
    pub async fn new() -> Self {
        Self::with_commit_on_exit(false).await
    }

    pub async fn with_commit_on_exit(commit_on_exit: bool) -> Self {
        let mut config = AppConfig::default();
        config.token.secret_key = "integration-test-secret".to_string();

        let engine = MemoryEngine::new();
        let registry = SessionRegistry::new(
            RegistryOptions::default()
                .engine(Arc::new(engine.clone()))
                .commit_on_exit(commit_on_exit),
        )
        .await
        .expect("Failed to build session registry");

        let state = AppState::new(config, registry).expect("Failed to build app state");
        let router = scaffold_api::router::build_router(state.clone());

        Self {
            router,
            engine,
            state,
        }
    }

    /// Store a user's credential directly in the engine
    pub fn create_test_user(&self, upn: &str, password: &str) {
        let hash = PasswordHasher::new()
            .hash(password)
            .expect("Failed to hash password");
        self.engine.seed(
            CredentialRepository::memory_key(upn),
            json!({ "upn": upn, "password_hash": hash }),
        );
    }

    /// Request a token and return the access token
    pub async fn login(&self, upn: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/token",
                Some(json!({ "upn": upn, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["access_token"]
            .as_str()
            .expect("No access_token in token response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The envelope's `code` field
    pub fn code(&self) -> u64 {
        self.body["code"].as_u64().expect("No code in envelope")
    }
}
