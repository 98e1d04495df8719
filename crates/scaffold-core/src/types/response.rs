//! Stable response codes rendered in the uniform response envelope.

use std::fmt;

use serde::Serialize;

/// A stable, machine-readable envelope code with its HTTP-equivalent status.
///
/// Codes never change once published; clients switch on `code`, not on the
/// human-readable `description`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResponseCode {
    /// Numeric envelope code.
    pub code: u32,
    /// Default message used when the error carries none.
    pub description: &'static str,
    /// HTTP-equivalent status for the boundary layer.
    pub status: u16,
}

impl ResponseCode {
    pub const SUCCESS: Self = Self::new(0, "success", 200);

    pub const VALIDATION_FAILED: Self = Self::new(10001, "request validation failed", 400);
    pub const UNAUTHORIZED: Self = Self::new(10002, "unauthorized", 401);
    pub const TOKEN_EXPIRED: Self = Self::new(10003, "token expired", 401);
    pub const TOKEN_INVALID: Self = Self::new(10004, "token validation failed", 401);
    pub const FORBIDDEN: Self = Self::new(10005, "forbidden", 403);
    pub const NOT_FOUND: Self = Self::new(10006, "resource not found", 404);
    pub const CONFLICT: Self = Self::new(10007, "resource conflict", 409);

    pub const NO_ACTIVE_SESSION: Self = Self::new(20001, "no active database session", 500);
    pub const REGISTRY_NOT_INITIALIZED: Self =
        Self::new(20002, "database session registry not initialized", 500);
    pub const SESSION_ERROR: Self = Self::new(20003, "database session error", 500);
    pub const DATABASE_ERROR: Self = Self::new(20004, "database error", 500);
    pub const CONFIGURATION_ERROR: Self = Self::new(20005, "configuration error", 500);

    pub const INTERNAL_ERROR: Self = Self::new(50000, "internal server error", 500);

    const fn new(code: u32, description: &'static str, status: u16) -> Self {
        Self {
            code,
            description,
            status,
        }
    }

    /// Whether this code denotes success.
    pub fn is_success(&self) -> bool {
        self.code == Self::SUCCESS.code
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.description)
    }
}
