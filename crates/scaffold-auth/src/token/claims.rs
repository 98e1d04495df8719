//! Identity token payload and issuance response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims carried by an identity token.
///
/// `upn` is the authenticated subject. `iss`, `aud` and `exp` are written by
/// the encoder and checked by the decoder; anything else the caller adds
/// travels in `extra` and comes back unchanged after verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// User principal name.
    pub upn: String,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience the token was verified against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Expiration (seconds since epoch, UTC).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Custom claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenPayload {
    /// A payload for `upn` with no other claims.
    pub fn new(upn: impl Into<String>) -> Self {
        Self {
            upn: upn.into(),
            iss: None,
            aud: None,
            exp: None,
            extra: Map::new(),
        }
    }

    /// Add a custom claim.
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// A custom claim by name.
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

/// A freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The encoded token.
    pub access_token: String,
    /// Validity the token was issued with, in seconds.
    pub expires_in: u64,
}
