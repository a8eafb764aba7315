//! Argon2id password hashing.
//!
//! Uses the argon2 crate defaults (Argon2id v0x13, 19 MiB, 2 iterations,
//! 1 lane), which match the OWASP recommendation. Hashes are stored as PHC
//! strings so parameters can change without invalidating old hashes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;

use uniassist_core::service::hash::PasswordHasher;
use uniassist_types::error::AuthError;

#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("secret1", &hash));
        assert!(!hasher.verify_password("secret2", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = Argon2PasswordHasher;
        let a = hasher.hash_password("same").unwrap();
        let b = hasher.hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        assert!(!Argon2PasswordHasher.verify_password("x", "not-a-phc-string"));
        assert!(!Argon2PasswordHasher.verify_password("x", ""));
    }
}
