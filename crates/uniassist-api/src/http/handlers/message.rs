//! Credit-charged assistant handlers: `/api/message/*`.

use axum::extract::State;
use serde_json::{Value, json};

use uniassist_types::chat::{
    EmailMessageRequest, MessageExchange, TextMessageRequest, VoiceMessageRequest,
};

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::extractors::json::ApiJson;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/message/text
pub async fn text_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<TextMessageRequest>,
) -> Result<ApiResponse<MessageExchange>, AppError> {
    let exchange = state.message_service.text(&user, body).await?;
    Ok(ApiResponse::success(exchange))
}

/// POST /api/message/email
pub async fn email_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<EmailMessageRequest>,
) -> Result<ApiResponse<MessageExchange>, AppError> {
    let exchange = state.message_service.email(&user, body).await?;
    Ok(ApiResponse::success(exchange))
}

/// POST /api/message/voice
pub async fn voice_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<VoiceMessageRequest>,
) -> Result<ApiResponse<MessageExchange>, AppError> {
    let exchange = state.message_service.voice(&user, body).await?;
    Ok(ApiResponse::success(exchange)
        .with_message("Voice message transcribed and processed successfully"))
}

/// GET /api/message/health
pub async fn message_health(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> ApiResponse<Value> {
    let health = state.message_service.health();
    let message = if health.transcription && health.llm {
        "Message services are ready"
    } else {
        "Some message services are not configured"
    };
    ApiResponse::success(json!({ "health": health })).with_message(message)
}
