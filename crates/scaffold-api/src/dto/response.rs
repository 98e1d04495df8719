//! The uniform response envelope and response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scaffold_core::types::{ResponseCode, SessionId};

/// Envelope wrapping every response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Stable numeric code; `0` on success.
    pub code: u32,
    /// Human-readable message.
    pub message: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Payload, `null` on failure.
    pub data: Option<T>,
    /// When the response was produced (ISO-8601).
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            code: ResponseCode::SUCCESS.code,
            message: ResponseCode::SUCCESS.description.to_string(),
            success: true,
            data: Some(data),
            timestamp: Utc::now(),
        }
    }

    /// A failed response with no data.
    pub fn fail(code: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code,
            message: message.into(),
            success: false,
            data: None,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Engine serving the request's session.
    pub engine: String,
    /// The request's session.
    pub session_id: SessionId,
}

/// Registration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredResponse {
    pub upn: String,
}
