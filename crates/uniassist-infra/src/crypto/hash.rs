//! SHA-256 digests for one-time codes.
//!
//! Implements the `ContentHasher` trait from `uniassist-core` using the
//! `sha2` crate (RustCrypto ecosystem).

use sha2::{Digest, Sha256};

use uniassist_core::service::hash::ContentHasher;

/// SHA-256 implementation of `ContentHasher`.
///
/// Computes lowercase hex-encoded digests. OTP codes are stored only in this form.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256ContentHasher;

impl ContentHasher for Sha256ContentHasher {
    fn compute_hash(&self, content: &str) -> String {
        hex::encode(Sha256::digest(content.as_bytes()))
    }
}
