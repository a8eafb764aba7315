//! Session token port.

use uniassist_types::error::AuthError;
use uniassist_types::user::UserId;

/// Issues and validates bearer tokens.
///
/// The adapter (`JwtTokenIssuer`) lives in uniassist-infra.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: &UserId) -> Result<String, AuthError>;

    /// Validate signature and expiry and return the subject.
    fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}
