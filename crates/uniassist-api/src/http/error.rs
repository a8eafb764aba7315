//! Application error type mapping to HTTP status codes and the
//! `{ success: false, message, code }` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use uniassist_types::error::{
    AuthError, ChatError, CreditError, GuestError, LlmError, MessageError, PaymentError,
    TranscriptionError,
};

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Auth(AuthError),
    Chat(ChatError),
    Message(MessageError),
    Credit(CreditError),
    Guest(GuestError),
    /// Missing or unusable bearer token.
    Unauthorized(String),
    /// Malformed request body.
    Validation(String),
    RateLimited { retry_after_secs: i64 },
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<MessageError> for AppError {
    fn from(e: MessageError) -> Self {
        AppError::Message(e)
    }
}

impl From<CreditError> for AppError {
    fn from(e: CreditError) -> Self {
        AppError::Credit(e)
    }
}

impl From<GuestError> for AppError {
    fn from(e: GuestError) -> Self {
        AppError::Guest(e)
    }
}

fn internal(e: &dyn std::error::Error) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %e, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Auth(e) => match e {
                AuthError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                AuthError::AlreadyExists => (StatusCode::CONFLICT, "USER_EXISTS", e.to_string()),
                AuthError::UserNotFound => {
                    (StatusCode::NOT_FOUND, "USER_NOT_FOUND", e.to_string())
                }
                AuthError::AlreadyVerified => {
                    (StatusCode::BAD_REQUEST, "ALREADY_VERIFIED", e.to_string())
                }
                AuthError::InvalidOtp(_) => (StatusCode::BAD_REQUEST, "INVALID_OTP", e.to_string()),
                AuthError::OtpExpired(_) => (StatusCode::BAD_REQUEST, "OTP_EXPIRED", e.to_string()),
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", e.to_string())
                }
                AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", e.to_string()),
                AuthError::MailDelivery(source) => {
                    tracing::error!(error = %source, "OTP mail delivery failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "MAIL_DELIVERY_FAILED",
                        e.to_string(),
                    )
                }
                AuthError::Hashing(_) | AuthError::Token(_) | AuthError::Repository(_) => internal(e),
            },

            AppError::Chat(e) => match e {
                ChatError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                ChatError::NotFound => (StatusCode::NOT_FOUND, "CHAT_NOT_FOUND", e.to_string()),
                ChatError::Repository(_) => internal(e),
            },

            AppError::Message(e) => match e {
                MessageError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                MessageError::ChatNotFound => {
                    (StatusCode::NOT_FOUND, "CHAT_NOT_FOUND", e.to_string())
                }
                MessageError::InsufficientCredits => (
                    StatusCode::PAYMENT_REQUIRED,
                    "INSUFFICIENT_CREDITS",
                    e.to_string(),
                ),
                MessageError::Llm(LlmError::NotConfigured) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "AI_NOT_CONFIGURED",
                    "AI service is not configured".to_string(),
                ),
                MessageError::Llm(source) => {
                    tracing::error!(error = %source, "completion failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "AI_SERVICE_ERROR", e.to_string())
                }
                MessageError::Transcription(TranscriptionError::NotConfigured) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "TRANSCRIPTION_NOT_CONFIGURED",
                    "Voice transcription is not configured".to_string(),
                ),
                MessageError::Transcription(TranscriptionError::Empty) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "NO_SPEECH_DETECTED",
                    TranscriptionError::Empty.to_string(),
                ),
                MessageError::Transcription(source) => {
                    tracing::error!(error = %source, "transcription failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "TRANSCRIPTION_FAILED",
                        e.to_string(),
                    )
                }
                MessageError::Repository(_) => internal(e),
            },

            AppError::Credit(e) => match e {
                CreditError::UnknownPlan => (StatusCode::BAD_REQUEST, "INVALID_PLAN", e.to_string()),
                CreditError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CreditError::UserNotFound => {
                    (StatusCode::NOT_FOUND, "USER_NOT_FOUND", e.to_string())
                }
                CreditError::TransactionNotFound => {
                    (StatusCode::NOT_FOUND, "TRANSACTION_NOT_FOUND", e.to_string())
                }
                CreditError::Payment(PaymentError::NotConfigured) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PAYMENTS_NOT_CONFIGURED",
                    "Payments are not configured".to_string(),
                ),
                CreditError::Payment(PaymentError::InvalidSignature) => {
                    (StatusCode::BAD_REQUEST, "INVALID_SIGNATURE", e.to_string())
                }
                CreditError::Payment(PaymentError::InvalidPayload(_)) => {
                    (StatusCode::BAD_REQUEST, "INVALID_PAYLOAD", e.to_string())
                }
                CreditError::Payment(PaymentError::Gateway(_)) => {
                    tracing::error!(error = %e, "payment gateway call failed");
                    (StatusCode::BAD_GATEWAY, "PAYMENT_GATEWAY_ERROR", e.to_string())
                }
                CreditError::Repository(_) => internal(e),
            },

            AppError::Guest(e) => match e {
                GuestError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                GuestError::SessionNotFound => {
                    (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", e.to_string())
                }
                GuestError::TranscriptionUnavailable => (
                    StatusCode::BAD_REQUEST,
                    "TRANSCRIPTION_UNAVAILABLE",
                    e.to_string(),
                ),
            },

            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Too many requests. Please try again in {retry_after_secs} seconds."),
            ),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = json!({
            "success": false,
            "message": message,
            "code": code,
        });

        let mut response = (status, Json(body)).into_response();
        if let AppError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = retry_after_secs.to_string().parse() {
                response
                    .headers_mut()
                    .insert(axum::http::header::RETRY_AFTER, value);
            }
        }
        response
    }
}
