//! Per-request scoped database session.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use scaffold_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Why a request left its scope on the failure path.
enum Rejected {
    /// The handler produced a 4xx or 5xx response.
    Response(Response),
    /// The session could not be opened or committed.
    Error(ApiError),
}

impl From<AppError> for Rejected {
    fn from(err: AppError) -> Self {
        Self::Error(ApiError(err))
    }
}

impl IntoResponse for Rejected {
    fn into_response(self) -> Response {
        match self {
            Self::Response(response) => response,
            Self::Error(err) => err.into_response(),
        }
    }
}

/// Runs the rest of the stack inside a scoped session.
///
/// Successful responses take the success exit (commit if the registry is
/// configured to); error responses take the rollback exit.
pub async fn db_session(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let result = state
        .registry
        .scope(async move {
            let response = next.run(request).await;
            let status = response.status();
            if status.is_client_error() || status.is_server_error() {
                Err(Rejected::Response(response))
            } else {
                Ok(response)
            }
        })
        .await;

    match result {
        Ok(response) => response,
        Err(rejected) => rejected.into_response(),
    }
}
