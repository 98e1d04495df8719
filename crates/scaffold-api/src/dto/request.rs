//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Token issuance request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TokenRequest {
    /// User principal name.
    #[validate(length(min = 1, message = "upn is required"))]
    pub upn: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    /// Requested validity; the configured default when absent.
    #[serde(default)]
    #[validate(range(max = 31_536_000, message = "ttl_seconds must be at most one year"))]
    pub ttl_seconds: Option<u64>,
}

/// Credential registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// User principal name.
    #[validate(length(min = 1, max = 255, message = "upn must be 1-255 characters"))]
    pub upn: String,
    /// Plaintext password.
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_request(ttl_seconds: Option<u64>) -> TokenRequest {
        TokenRequest {
            upn: "alice".to_string(),
            password: "password123".to_string(),
            ttl_seconds,
        }
    }

    #[test]
    fn test_ttl_is_capped_at_one_year() {
        assert!(token_request(None).validate().is_ok());
        assert!(token_request(Some(31_536_000)).validate().is_ok());
        assert!(token_request(Some(31_536_001)).validate().is_err());
        assert!(token_request(Some(u64::MAX)).validate().is_err());
    }
}
