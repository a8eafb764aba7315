//! One-time password generation and checking.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uniassist_types::user::OtpChallenge;

use super::hash::ContentHasher;

/// Outcome of checking a submitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    Valid,
    Mismatch,
    Expired,
}

/// A random six-digit code in `100000..=999999`.
pub fn generate_code() -> String {
    rand::rng().random_range(100_000..=999_999u32).to_string()
}

/// Strip whitespace users paste in from the mail ("482 913").
pub fn normalize_code(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Create a new code and the challenge to store for it.
pub fn issue<H: ContentHasher>(
    hasher: &H,
    ttl: Duration,
    now: DateTime<Utc>,
) -> (String, OtpChallenge) {
    let code = generate_code();
    let challenge = OtpChallenge {
        code_hash: hasher.compute_hash(&code),
        expires_at: now + ttl,
    };
    (code, challenge)
}

/// Compare a submitted code against the stored challenge.
///
/// A wrong code is reported before an expired one. No challenge at all
/// counts as a mismatch.
pub fn check<H: ContentHasher>(
    hasher: &H,
    challenge: Option<&OtpChallenge>,
    submitted: &str,
    now: DateTime<Utc>,
) -> OtpCheck {
    let Some(challenge) = challenge else {
        return OtpCheck::Mismatch;
    };
    let code = normalize_code(submitted);
    if code.is_empty() || hasher.compute_hash(&code) != challenge.code_hash {
        return OtpCheck::Mismatch;
    }
    if challenge.is_expired(now) {
        return OtpCheck::Expired;
    }
    OtpCheck::Valid
}
