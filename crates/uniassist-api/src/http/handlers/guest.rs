//! Unauthenticated guest handlers: `/api/guest/*`.

use axum::extract::{Query, State};
use serde_json::{Value, json};

use uniassist_types::guest::{
    GuestChatRequest, GuestEmailRequest, GuestHistory, GuestReply, GuestSessionRef,
    GuestVoiceRequest,
};

use crate::http::error::AppError;
use crate::http::extractors::json::ApiJson;
use crate::http::response::{ApiResponse, Empty};
use crate::state::AppState;

/// POST /api/guest/chat
pub async fn guest_chat(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GuestChatRequest>,
) -> Result<ApiResponse<GuestReply>, AppError> {
    let reply = state.guest_service.chat(body).await?;
    Ok(ApiResponse::success(reply))
}

/// POST /api/guest/voice
pub async fn guest_voice(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GuestVoiceRequest>,
) -> Result<ApiResponse<GuestReply>, AppError> {
    let reply = state.guest_service.voice(body).await?;
    Ok(ApiResponse::success(reply))
}

/// POST /api/guest/email
pub async fn guest_email(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GuestEmailRequest>,
) -> Result<ApiResponse<GuestReply>, AppError> {
    let reply = state.guest_service.email(body).await?;
    Ok(ApiResponse::success(reply))
}

/// GET /api/guest/history?sessionId=...
pub async fn guest_history(
    State(state): State<AppState>,
    Query(query): Query<GuestSessionRef>,
) -> Result<ApiResponse<GuestHistory>, AppError> {
    let history = state.guest_service.history(query.session_id.as_deref())?;
    Ok(ApiResponse::success(history))
}

/// POST /api/guest/clear
pub async fn guest_clear(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GuestSessionRef>,
) -> Result<ApiResponse<Empty>, AppError> {
    state.guest_service.clear(body.session_id.as_deref())?;
    Ok(ApiResponse::message("Session cleared successfully."))
}

/// GET /api/guest/health
pub async fn guest_health(State(state): State<AppState>) -> ApiResponse<Value> {
    let health = state.guest_service.health().await;
    let message = if health.knowledge_base {
        "Guest chat is healthy"
    } else {
        "Knowledge base is unreachable; guests get fallback replies"
    };
    ApiResponse::success(json!({ "health": health })).with_message(message)
}

/// POST /api/guest/cleanup
pub async fn guest_cleanup(State(state): State<AppState>) -> ApiResponse<Value> {
    let stats = state.guest_service.cleanup();
    ApiResponse::success(json!({ "stats": stats }))
        .with_message(format!("Cleaned up {} expired guest sessions.", stats.cleaned))
}
