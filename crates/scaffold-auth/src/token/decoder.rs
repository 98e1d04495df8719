//! Token verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::{Map, Value};
use tracing::debug;

use scaffold_core::error::AppError;
use scaffold_core::result::AppResult;

use super::claims::TokenPayload;

/// Verifies identity tokens.
///
/// Failures are reported in a fixed order: signature or structure, then
/// issuer, then audience, then expiry, then subject. A token with a foreign
/// issuer is therefore `TokenInvalid` even if it has also expired.
#[derive(Clone)]
pub struct TokenDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
}

impl std::fmt::Debug for TokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDecoder")
            .field("algorithms", &self.validation.algorithms)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl TokenDecoder {
    pub(crate) fn new(secret: &[u8], algorithm: Algorithm, issuer: String, audience: String) -> Self {
        // Only the signature and header are checked by jsonwebtoken; claims
        // are checked below so the precedence stays fixed.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer,
            audience,
        }
    }

    /// Decode `token` and check its claims.
    pub async fn verify(&self, token: &str) -> AppResult<TokenPayload> {
        let mut claims = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                AppError::token_invalid("Token validation failed")
            })?
            .claims;

        if claims.get("iss").and_then(Value::as_str) != Some(self.issuer.as_str()) {
            return Err(AppError::token_invalid("Token issuer is not accepted"));
        }
        if !self.audience_matches(claims.get("aud")) {
            return Err(AppError::token_invalid("Token audience is not accepted"));
        }

        let exp = claims
            .get("exp")
            .and_then(numeric_date)
            .ok_or_else(|| AppError::token_invalid("Token has no valid expiry"))?;
        if exp <= Utc::now().timestamp() {
            return Err(AppError::token_expired("Token has expired"));
        }

        match claims.get("upn").and_then(Value::as_str) {
            Some(upn) if !upn.is_empty() => {}
            _ => return Err(AppError::token_invalid("Token has no subject")),
        }

        // Normalize the registered claims to the payload's shapes.
        claims.insert("aud".to_string(), Value::from(self.audience.clone()));
        claims.insert("exp".to_string(), Value::from(exp));

        serde_json::from_value(Value::Object(claims)).map_err(|e| {
            debug!(error = %e, "Token payload rejected");
            AppError::token_invalid("Token payload is malformed")
        })
    }

    fn audience_matches(&self, aud: Option<&Value>) -> bool {
        match aud {
            Some(Value::String(aud)) => *aud == self.audience,
            Some(Value::Array(items)) => items
                .iter()
                .any(|item| item.as_str() == Some(self.audience.as_str())),
            _ => false,
        }
    }
}

fn numeric_date(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs as i64))
}
