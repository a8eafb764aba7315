//! Bearer-token authentication extractor.
//!
//! Accepts the JWT from:
//! - `Authorization: Bearer <token>`
//! - `Authorization: <token>` (bare token, as older clients send it)
//!
//! The token must verify and its user must still exist.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use uniassist_types::user::User;

use crate::http::error::AppError;
use crate::state::AppState;

const MISSING_TOKEN: &str = "Not authorized, no token";

/// The authenticated caller. Extracting this validates the token.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let user = state.auth_service.authenticate(&token).await?;
        Ok(CurrentUser(user))
    }
}

/// Pull the token out of the `Authorization` header.
fn extract_token(parts: &Parts) -> Result<String, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized(MISSING_TOKEN.to_string()))?;
    let value = header.to_str().map_err(|_| {
        AppError::Unauthorized("Invalid Authorization header encoding".to_string())
    })?;

    let token = value
        .strip_prefix("Bearer ")
        .unwrap_or(value)
        .trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized(MISSING_TOKEN.to_string()));
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_and_bare_tokens() {
        assert_eq!(extract_token(&parts_with(Some("Bearer abc.def"))).unwrap(), "abc.def");
        assert_eq!(extract_token(&parts_with(Some("abc.def"))).unwrap(), "abc.def");
    }

    #[test]
    fn test_missing_or_blank_token() {
        assert!(matches!(
            extract_token(&parts_with(None)),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            extract_token(&parts_with(Some("Bearer   "))),
            Err(AppError::Unauthorized(_))
        ));
    }
}
