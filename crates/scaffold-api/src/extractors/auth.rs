//! `AuthUser` extractor: pulls the bearer token from the Authorization header and verifies it.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use scaffold_auth::TokenPayload;
use scaffold_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// The verified token payload of the caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub TokenPayload);

impl AuthUser {
    /// The caller's user principal name.
    pub fn upn(&self) -> &str {
        &self.0.upn
    }
}

impl std::ops::Deref for AuthUser {
    type Target = TokenPayload;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        let payload = state.token_codec.verify(token).await?;
        Ok(AuthUser(payload))
    }
}
