//! Auth handlers: token issuance, registration, me.

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use tracing::info;
use validator::Validate;

use scaffold_auth::{TokenPayload, TokenResponse};
use scaffold_core::error::AppError;
use scaffold_database::CredentialRepository;

use crate::dto::request::{RegisterRequest, TokenRequest};
use crate::dto::response::{ApiResponse, RegisteredResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/token
pub async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let stored = CredentialRepository::new()
        .find_password_hash(&req.upn)
        .await?;
    let verified = stored
        .as_deref()
        .is_some_and(|hash| state.password_hasher.verify(&req.password, hash));
    if !verified {
        return Err(AppError::unauthorized("Invalid credentials").into());
    }

    let issued = state.token_codec.create(
        TokenPayload::new(req.upn.clone()),
        req.ttl_seconds.map(Duration::from_secs),
    )?;
    info!(upn = %req.upn, "Token issued");

    Ok(Json(ApiResponse::ok(issued)))
}

/// POST /api/auth/register
///
/// Commits explicitly, so the credential is durable whatever the registry's
/// commit-on-exit default.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<RegisteredResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = CredentialRepository::new();
    if repo.find_password_hash(&req.upn).await?.is_some() {
        return Err(AppError::conflict(format!("User '{}' already exists", req.upn)).into());
    }

    let hash = state.password_hasher.hash(&req.password)?;
    repo.upsert_password_hash(&req.upn, &hash).await?;
    state.registry.current_session()?.commit().await?;
    info!(upn = %req.upn, "User registered");

    Ok(Json(ApiResponse::ok(RegisteredResponse { upn: req.upn })))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<TokenPayload>> {
    Json(ApiResponse::ok(auth.0))
}
