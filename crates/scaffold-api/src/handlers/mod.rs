//! Route handlers organized by domain.

pub mod auth;
pub mod health;

use scaffold_core::error::AppError;

use crate::error::ApiError;

/// Fallback for unmatched routes.
pub async fn not_found() -> ApiError {
    ApiError(AppError::not_found("Route not found"))
}
