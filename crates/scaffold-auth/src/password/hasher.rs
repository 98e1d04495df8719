//! Argon2id password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tracing::debug;

use scaffold_core::error::AppError;
use scaffold_core::result::AppResult;

/// Hashes and verifies passwords using Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with a random salt into a PHC string.
    pub fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Whether `password` matches the stored `hashed` value.
    ///
    /// A malformed stored hash is a mismatch, not an error.
    pub fn verify(&self, password: &str, hashed: &str) -> bool {
        let parsed = match PasswordHash::new(hashed) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                debug!(error = %e, "Password verification failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = PasswordHasher::new();
        let hashed = hasher.hash("correct horse").unwrap();

        assert!(hashed.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hashed));
        assert!(!hasher.verify("correct horsf", &hashed));
        assert!(!hasher.verify("", &hashed));
    }

    #[test]
    fn test_same_password_gets_distinct_hashes() {
        let hasher = PasswordHasher::new();
        let first = hasher.hash("pw").unwrap();
        let second = hasher.hash("pw").unwrap();
        assert_ne!(first, second);
        assert!(hasher.verify("pw", &first));
        assert!(hasher.verify("pw", &second));
    }

    #[test]
    fn test_mutated_hash_does_not_verify() {
        let hasher = PasswordHasher::new();
        let hashed = hasher.hash("secret").unwrap();

        // Flip one character in the middle of the hash segment.
        let hash_start = hashed.rfind('$').unwrap() + 1;
        let index = hash_start + (hashed.len() - hash_start) / 2;
        let original = hashed.as_bytes()[index];
        let replacement = if original == b'A' { 'B' } else { 'A' };
        let mut mutated = hashed.clone();
        mutated.replace_range(index..index + 1, &replacement.to_string());

        assert_ne!(mutated, hashed);
        assert!(!hasher.verify("secret", &mutated));
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify("secret", "not-a-hash"));
        assert!(!hasher.verify("secret", ""));
        assert!(!hasher.verify("secret", "$argon2id$v=19$m=19456,t=2,p=1$$"));
    }
}
