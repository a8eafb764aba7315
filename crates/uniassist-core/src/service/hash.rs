//! Hashing ports.
//!
//! Defined in uniassist-core so services can hash secrets without coupling
//! to a specific algorithm. The adapters (`Sha256ContentHasher`,
//! `Argon2PasswordHasher`) live in uniassist-infra.

use uniassist_types::error::AuthError;

/// Fast, deterministic digest used for OTP codes.
///
/// OTPs are short-lived and compared once, so a plain SHA-256 digest is
/// enough to keep the plaintext code out of the database.
pub trait ContentHasher: Send + Sync {
    /// Compute a hex-encoded hash of the given content.
    fn compute_hash(&self, content: &str) -> String;
}

/// Slow, salted hashing for account passwords.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing string (PHC format).
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    /// Check a plaintext password against a stored hash. Malformed hashes
    /// verify as `false`.
    fn verify_password(&self, password: &str, hash: &str) -> bool;
}
