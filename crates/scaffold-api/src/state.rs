//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use scaffold_auth::{PasswordHasher, TokenCodec};
use scaffold_core::config::AppConfig;
use scaffold_core::result::AppResult;
use scaffold_database::SessionRegistry;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Identity token encoder and decoder
    pub token_codec: Arc<TokenCodec>,
    /// Password hasher (Argon2)
    pub password_hasher: Arc<PasswordHasher>,
    /// Source of the per-request scoped sessions
    pub registry: SessionRegistry,
}

impl AppState {
    /// Build the state; fails if the token settings are unusable.
    pub fn new(config: AppConfig, registry: SessionRegistry) -> AppResult<Self> {
        let token_codec = TokenCodec::new(&config.token)?;
        Ok(Self {
            config: Arc::new(config),
            token_codec: Arc::new(token_codec),
            password_hasher: Arc::new(PasswordHasher::new()),
            registry,
        })
    }
}
