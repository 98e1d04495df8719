//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use scaffold_core::error::AppError;

use crate::dto::response::ApiResponse;

/// Boundary wrapper rendering an [`AppError`] as an envelope response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let code = err.kind.response_code();
        let status =
            StatusCode::from_u16(code.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(kind = %err.kind, error = %err, "Internal server error");
        }

        let message = if err.message.is_empty() {
            code.description.to_string()
        } else {
            err.message
        };

        (status, Json(ApiResponse::<()>::fail(code, message))).into_response()
    }
}
