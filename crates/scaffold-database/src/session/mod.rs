//! Context-scoped database sessions.
//!
//! One process-wide [`SessionRegistry`] is installed at startup with
//! [`initialize`]. Each unit of work runs inside [`scope`], which opens a
//! session, makes it reachable through [`current`] from any depth of the call
//! chain, and commits or rolls back and closes it when the body finishes,
//! fails, panics, or is cancelled.

pub mod context;
mod handle;
mod registry;
mod shared;

use std::future::Future;
use std::sync::OnceLock;

use tracing::{info, warn};

use scaffold_core::error::AppError;
use scaffold_core::result::AppResult;

pub use handle::{ExitOutcome, HandleState, ScopeOptions, ScopedSession};
pub use registry::{RegistryOptions, SessionRegistry};
pub use shared::{Session, SessionGuard};

static REGISTRY: OnceLock<SessionRegistry> = OnceLock::new();

/// Build a registry and install it process-wide.
///
/// Fails with a configuration error if a registry is already installed; the
/// engine built by the losing call is closed.
pub async fn initialize(options: RegistryOptions) -> AppResult<SessionRegistry> {
    if REGISTRY.get().is_some() {
        return Err(already_initialized());
    }

    let registry = SessionRegistry::new(options).await?;
    match REGISTRY.set(registry.clone()) {
        Ok(()) => {
            info!("Session registry initialized");
            Ok(registry)
        }
        Err(losing) => {
            warn!("Concurrent session registry initialization, discarding engine");
            losing.close().await;
            Err(already_initialized())
        }
    }
}

fn already_initialized() -> AppError {
    AppError::configuration("Session registry is already initialized")
}

/// The installed registry.
pub fn registry() -> AppResult<SessionRegistry> {
    REGISTRY
        .get()
        .cloned()
        .ok_or_else(AppError::registry_not_initialized)
}

/// The session of the innermost enclosing scope on this task.
pub fn current() -> AppResult<Session> {
    registry()?.current_session()
}

/// Run `body` inside a scoped session from the installed registry.
pub async fn scope<F, T, E>(body: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<AppError>,
{
    registry().map_err(E::from)?.scope(body).await
}

/// [`scope`] with per-scope overrides.
pub async fn scope_with<F, T, E>(options: ScopeOptions, body: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<AppError>,
{
    registry()
        .map_err(E::from)?
        .scope_with(options, body)
        .await
}
