//! Stored password hashes keyed by user principal name.

use serde_json::{Value, json};

use scaffold_core::error::{AppError, ErrorKind};
use scaffold_core::result::AppResult;

use crate::connection::PgSession;
use crate::memory::MemorySession;
use crate::session::{Session, context};

/// Reads and writes credentials through the current session.
///
/// PostgreSQL uses the `users (upn, password_hash)` table; the memory engine
/// stores `{"upn", "password_hash"}` objects under `user:{upn}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialRepository;

impl CredentialRepository {
    pub fn new() -> Self {
        Self
    }

    /// Key a credential is stored under in the memory engine.
    pub fn memory_key(upn: &str) -> String {
        format!("user:{upn}")
    }

    /// The stored password hash for `upn`, if the user exists.
    pub async fn find_password_hash(&self, upn: &str) -> AppResult<Option<String>> {
        let session = current_session()?;
        let mut guard = session.lock().await?;

        if let Ok(memory) = guard.backend::<MemorySession>() {
            let stored = memory.get(&Self::memory_key(upn))?;
            return Ok(stored
                .as_ref()
                .and_then(|v| v.get("password_hash"))
                .and_then(Value::as_str)
                .map(str::to_string));
        }

        let conn = guard.backend_mut::<PgSession>()?.connection().await?;
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE upn = $1")
            .bind(upn)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find password hash", e)
            })
    }

    /// Insert or replace the password hash for `upn`.
    ///
    /// The write becomes durable when the session commits.
    pub async fn upsert_password_hash(&self, upn: &str, password_hash: &str) -> AppResult<()> {
        let session = current_session()?;
        let mut guard = session.lock().await?;

        if let Ok(memory) = guard.backend_mut::<MemorySession>() {
            return memory.put(
                Self::memory_key(upn),
                json!({ "upn": upn, "password_hash": password_hash }),
            );
        }

        let conn = guard.backend_mut::<PgSession>()?.connection().await?;
        sqlx::query(
            "INSERT INTO users (upn, password_hash) VALUES ($1, $2) \
             ON CONFLICT (upn) DO UPDATE SET password_hash = EXCLUDED.password_hash",
        )
        .bind(upn)
        .bind(password_hash)
        .execute(conn)
        .await
        .map(|_| ())
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store password hash", e))
    }
}

fn current_session() -> AppResult<Session> {
    context::current().ok_or_else(AppError::no_active_session)
}
