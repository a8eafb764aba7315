//! HS256 bearer tokens.
//!
//! Claims carry the user id as `id` plus `iat`/`exp`. Tokens are stateless:
//! there is no server-side revocation.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use uniassist_core::service::token::TokenIssuer;
use uniassist_types::error::AuthError;
use uniassist_types::user::UserId;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: String,
    iat: i64,
    exp: i64,
}

pub struct JwtTokenIssuer {
    secret: SecretString,
    ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user_id: &UserId) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let key = EncodingKey::from_secret(self.secret.expose_secret().as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| AuthError::Token(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let claims = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                AuthError::Unauthorized
            })?
            .claims;
        claims.id.parse().map_err(|_| AuthError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str, ttl: Duration) -> JwtTokenIssuer {
        JwtTokenIssuer::new(SecretString::from(secret.to_string()), ttl)
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = issuer("campus-secret", Duration::days(30));
        let id = UserId::new();
        let token = tokens.issue(&id).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), id);
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token = issuer("one", Duration::days(1)).issue(&UserId::new()).unwrap();
        assert!(matches!(
            issuer("two", Duration::days(1)).verify(&token),
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        // Well past the default 60s leeway.
        let tokens = issuer("campus-secret", Duration::minutes(-10));
        let token = tokens.issue(&UserId::new()).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn test_garbage_is_unauthorized() {
        let tokens = issuer("campus-secret", Duration::days(1));
        assert!(matches!(tokens.verify("not.a.jwt"), Err(AuthError::Unauthorized)));
    }
}
