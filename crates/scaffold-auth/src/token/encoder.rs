//! Token issuance.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Map, Value};
use tracing::debug;

use scaffold_core::error::AppError;
use scaffold_core::result::AppResult;

use super::claims::{TokenPayload, TokenResponse};

/// Signs identity tokens with a fixed key and algorithm.
#[derive(Clone)]
pub struct TokenEncoder {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
    default_ttl: Duration,
}

impl std::fmt::Debug for TokenEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEncoder")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl TokenEncoder {
    pub(crate) fn new(
        secret: &[u8],
        algorithm: Algorithm,
        issuer: String,
        audience: String,
        default_ttl: Duration,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            algorithm,
            issuer,
            audience,
            default_ttl,
        }
    }

    /// Issue a token for `payload`, valid for `ttl` (or the configured default).
    ///
    /// `exp`, `iss` and `aud` always come from the encoder; values already
    /// present in the payload are overwritten.
    pub fn create(&self, payload: TokenPayload, ttl: Option<Duration>) -> AppResult<TokenResponse> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let expire = expiry_from(Utc::now().timestamp(), ttl)?;

        let mut claims = match serde_json::to_value(&payload)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        claims.insert("exp".to_string(), Value::from(expire));
        claims.insert("iss".to_string(), Value::from(self.issuer.clone()));
        claims.insert("aud".to_string(), Value::from(self.audience.clone()));

        let access_token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        debug!(upn = %payload.upn, ttl_seconds = ttl.as_secs(), "Issued token");

        Ok(TokenResponse {
            access_token,
            expires_in: ttl.as_secs(),
        })
    }
}

/// `now + ttl` as a Unix timestamp, rejecting lifetimes that do not fit.
fn expiry_from(now: i64, ttl: Duration) -> AppResult<i64> {
    i64::try_from(ttl.as_secs())
        .ok()
        .and_then(|secs| now.checked_add(secs))
        .ok_or_else(|| {
            AppError::validation(format!(
                "Token lifetime of {} seconds is out of range",
                ttl.as_secs()
            ))
        })
}
