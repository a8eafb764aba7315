//! Account handlers: `/api/user/*`.

use axum::extract::State;
use chrono::Utc;
use serde_json::{Value, json};

use uniassist_core::service::rate_limit::Reservation;
use uniassist_types::user::{
    EmailRequest, LoginRequest, RegisterRequest, ResetPasswordRequest, UserProfile,
    VerifyOtpRequest,
};

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::extractors::client::ClientKey;
use crate::http::extractors::json::ApiJson;
use crate::http::response::{ApiResponse, Empty};
use crate::state::AppState;

/// Reserve a failure slot for this client on `route`, rejecting the request
/// when none are left.
fn reserve_attempt(
    state: &AppState,
    route: &str,
    client: &str,
) -> Result<(String, Reservation), AppError> {
    let key = format!("{route}:{client}");
    let reservation = state
        .rate_limiter
        .reserve(&key, Utc::now())
        .map_err(|retry_after| AppError::RateLimited {
            retry_after_secs: retry_after.num_seconds().max(1),
        })?;
    Ok((key, reservation))
}

/// POST /api/user/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<ApiResponse<Empty>, AppError> {
    state.auth_service.register(body).await?;
    Ok(ApiResponse::message(
        "OTP sent to your email. Please check your inbox.",
    ))
}

/// POST /api/user/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<VerifyOtpRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let session = state.auth_service.verify_otp(body).await?;
    Ok(
        ApiResponse::success(json!({ "token": session.token, "user": session.user }))
            .with_message("Account verified successfully!"),
    )
}

/// POST /api/user/resend-otp (rate limited)
pub async fn resend_otp(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    ApiJson(body): ApiJson<EmailRequest>,
) -> Result<ApiResponse<Empty>, AppError> {
    let (key, reservation) = reserve_attempt(&state, "resend-otp", &client)?;
    state.auth_service.resend_otp(body).await?;
    state.rate_limiter.release(&key, reservation);
    Ok(ApiResponse::message(
        "New OTP sent to your email. Please check your inbox.",
    ))
}

/// POST /api/user/forgot-password (rate limited)
///
/// Answers the same way whether or not the account exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    ApiJson(body): ApiJson<EmailRequest>,
) -> Result<ApiResponse<Empty>, AppError> {
    let (key, reservation) = reserve_attempt(&state, "forgot-password", &client)?;
    state.auth_service.forgot_password(body).await?;
    state.rate_limiter.release(&key, reservation);
    Ok(ApiResponse::message(
        "If an account exists, an OTP has been sent to your email",
    ))
}

/// POST /api/user/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ResetPasswordRequest>,
) -> Result<ApiResponse<Empty>, AppError> {
    state.auth_service.reset_password(body).await?;
    Ok(ApiResponse::message("Password reset successfully"))
}

/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let session = state.auth_service.login(body).await?;
    Ok(
        ApiResponse::success(json!({ "token": session.token, "user": session.user }))
            .with_message("Login successful"),
    )
}

/// GET /api/user/get
pub async fn get_user(CurrentUser(user): CurrentUser) -> ApiResponse<Value> {
    ApiResponse::success(json!({ "user": UserProfile::from(&user) }))
}
