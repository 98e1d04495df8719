//! # scaffold-auth
//!
//! Authentication primitives for the scaffold.
//!
//! ## Modules
//!
//! - `token`: identity token issuance and verification
//! - `password`: Argon2id password hashing

pub mod password;
pub mod token;

pub use password::PasswordHasher;
pub use token::{TokenCodec, TokenDecoder, TokenEncoder, TokenPayload, TokenResponse};
