//! Identity token issuance and verification.

pub mod claims;
pub mod decoder;
pub mod encoder;

use std::time::Duration;

use jsonwebtoken::Algorithm;

use scaffold_core::config::TokenConfig;
use scaffold_core::error::AppError;
use scaffold_core::result::AppResult;

pub use claims::{TokenPayload, TokenResponse};
pub use decoder::TokenDecoder;
pub use encoder::TokenEncoder;

/// Encoder and decoder sharing one key, algorithm, issuer and audience.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    encoder: TokenEncoder,
    decoder: TokenDecoder,
}

impl TokenCodec {
    /// Build a codec from the `token` config section.
    ///
    /// Only the HMAC algorithms are accepted.
    pub fn new(config: &TokenConfig) -> AppResult<Self> {
        let algorithm = parse_algorithm(&config.algorithm)?;
        let secret = config.secret_key.as_bytes();
        if secret.is_empty() {
            return Err(AppError::configuration("Token secret key is empty"));
        }

        Ok(Self {
            encoder: TokenEncoder::new(
                secret,
                algorithm,
                config.issuer.clone(),
                config.audience.clone(),
                Duration::from_secs(config.default_ttl_seconds),
            ),
            decoder: TokenDecoder::new(
                secret,
                algorithm,
                config.issuer.clone(),
                config.audience.clone(),
            ),
        })
    }

    /// See [`TokenEncoder::create`].
    pub fn create(&self, payload: TokenPayload, ttl: Option<Duration>) -> AppResult<TokenResponse> {
        self.encoder.create(payload, ttl)
    }

    /// See [`TokenDecoder::verify`].
    pub async fn verify(&self, token: &str) -> AppResult<TokenPayload> {
        self.decoder.verify(token).await
    }
}

fn parse_algorithm(name: &str) -> AppResult<Algorithm> {
    match name.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(AppError::configuration(format!(
            "Unsupported token algorithm: {other}"
        ))),
    }
}
