//! Application assembly and server lifecycle.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::Notify;
use tracing::{info, warn};

use scaffold_core::config::AppConfig;
use scaffold_core::error::{AppError, ErrorKind};
use scaffold_core::result::AppResult;
use scaffold_database::SessionRegistry;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the full application router.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Serves the API until Ctrl+C, then drains in-flight requests for at most
/// `server.shutdown_grace_seconds`.
pub async fn run_server(config: AppConfig, registry: SessionRegistry) -> AppResult<()> {
    let state = AppState::new(config, registry)?;
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind '{addr}'"), e)
    })?;
    info!(address = %addr, "Server listening");

    let shutdown = Arc::new(Notify::new());
    let signalled = Arc::clone(&shutdown);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            signalled.notify_one();
        })
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;
        }
        _ = async {
            shutdown.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
        }
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
