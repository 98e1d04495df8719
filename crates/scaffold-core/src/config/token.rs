//! Identity token configuration.

use serde::{Deserialize, Serialize};

/// Signing and validation settings for identity tokens.
///
/// Field names mirror the recognized `TOKEN_*` options; the environment
/// overlay reads them as `SCAFFOLD_TOKEN__SECRET_KEY` and so on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Secret key for HMAC signing.
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    /// Signing algorithm name (`HS256`, `HS384`, `HS512`).
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Value written to and required in the `iss` claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Value written to and required in the `aud` claim.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Token lifetime used when the caller does not pass one.
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            algorithm: default_algorithm(),
            issuer: default_issuer(),
            audience: default_audience(),
            default_ttl_seconds: default_ttl_seconds(),
        }
    }
}

fn default_secret_key() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_issuer() -> String {
    "scaffold".to_string()
}

fn default_audience() -> String {
    "scaffold-clients".to_string()
}

fn default_ttl_seconds() -> u64 {
    3600
}
