//! Cryptographic adapters for UniAssist.
//!
//! - `hash`: SHA-256 digests for one-time codes
//! - `password`: Argon2id password hashing
//! - `token`: HS256 session tokens

pub mod hash;
pub mod password;
pub mod token;
