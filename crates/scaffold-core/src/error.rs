//! Unified application error types.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Every [`ErrorKind`] resolves to exactly
//! one stable [`ResponseCode`] so the boundary layer can render it inside the
//! uniform response envelope.

use std::fmt;
use thiserror::Error;

use crate::types::response::ResponseCode;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input validation failed.
    Validation,
    /// The request carries no usable credentials.
    Unauthorized,
    /// The identity token was well formed but its expiry has passed.
    TokenExpired,
    /// The identity token failed signature, claim, or subject checks.
    TokenInvalid,
    /// The caller does not have permission to perform the action.
    Forbidden,
    /// The requested resource was not found.
    NotFound,
    /// A conflict occurred (duplicate entry, concurrent modification, etc.).
    Conflict,
    /// The current task is not inside a scoped database session.
    NoActiveSession,
    /// The session registry was used before it was initialized.
    RegistryNotInitialized,
    /// A session lifecycle error (closed session, double exit, etc.).
    Session,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl ErrorKind {
    /// The stable envelope code for this kind of error.
    pub fn response_code(&self) -> ResponseCode {
        match self {
            Self::Validation => ResponseCode::VALIDATION_FAILED,
            Self::Unauthorized => ResponseCode::UNAUTHORIZED,
            Self::TokenExpired => ResponseCode::TOKEN_EXPIRED,
            Self::TokenInvalid => ResponseCode::TOKEN_INVALID,
            Self::Forbidden => ResponseCode::FORBIDDEN,
            Self::NotFound => ResponseCode::NOT_FOUND,
            Self::Conflict => ResponseCode::CONFLICT,
            Self::NoActiveSession => ResponseCode::NO_ACTIVE_SESSION,
            Self::RegistryNotInitialized => ResponseCode::REGISTRY_NOT_INITIALIZED,
            Self::Session => ResponseCode::SESSION_ERROR,
            Self::Database => ResponseCode::DATABASE_ERROR,
            Self::Configuration => ResponseCode::CONFIGURATION_ERROR,
            Self::Serialization | Self::Internal => ResponseCode::INTERNAL_ERROR,
        }
    }

    /// Whether this kind is an expected client-facing authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::TokenExpired => write!(f, "TOKEN_EXPIRED"),
            Self::TokenInvalid => write!(f, "TOKEN_INVALID"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::NoActiveSession => write!(f, "NO_ACTIVE_SESSION"),
            Self::RegistryNotInitialized => write!(f, "REGISTRY_NOT_INITIALIZED"),
            Self::Session => write!(f, "SESSION"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a token-expired error.
    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExpired, message)
    }

    /// Create a token-invalid error.
    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenInvalid, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a no-active-session error.
    pub fn no_active_session() -> Self {
        Self::new(
            ErrorKind::NoActiveSession,
            "No session found: not inside a request or a scoped database session",
        )
    }

    /// Create a registry-not-initialized error.
    pub fn registry_not_initialized() -> Self {
        Self::new(
            ErrorKind::RegistryNotInitialized,
            "Session registry not initialized: call session::initialize at startup",
        )
    }

    /// Create a session lifecycle error.
    pub fn session(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Session, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
