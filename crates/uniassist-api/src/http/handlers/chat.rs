//! Chat CRUD handlers: `/api/chat/*`.

use axum::extract::{Path, State};
use serde_json::{Value, json};

use uniassist_types::chat::{ChatIdRequest, CreateChatRequest, RenameChatRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::extractors::json::ApiJson;
use crate::http::response::{ApiResponse, Empty};
use crate::state::AppState;

/// POST /api/chat/create
pub async fn create_chat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<CreateChatRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let chat = state.chat_service.create(&user, body).await?;
    Ok(ApiResponse::success(json!({ "chat": chat })).with_message("Chat Created"))
}

/// GET /api/chat/all
pub async fn list_chats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<ApiResponse<Value>, AppError> {
    let chats = state.chat_service.list(&user).await?;
    Ok(ApiResponse::success(json!({ "chats": chats })))
}

/// GET /api/chat/{chatId}
pub async fn get_chat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(chat_id): Path<String>,
) -> Result<ApiResponse<Value>, AppError> {
    let chat = state.chat_service.get(&user, Some(&chat_id)).await?;
    Ok(ApiResponse::success(json!({ "chat": chat })))
}

/// DELETE /api/chat/delete
pub async fn delete_chat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ChatIdRequest>,
) -> Result<ApiResponse<Empty>, AppError> {
    state
        .chat_service
        .delete(&user, body.chat_id.as_deref())
        .await?;
    Ok(ApiResponse::message("Chat deleted"))
}

/// PUT /api/chat/rename
pub async fn rename_chat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<RenameChatRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let chat = state.chat_service.rename(&user, body).await?;
    Ok(ApiResponse::success(json!({ "chat": chat })).with_message("Chat name updated"))
}

/// POST /api/chat/clear
pub async fn clear_chat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ChatIdRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let chat = state
        .chat_service
        .clear(&user, body.chat_id.as_deref())
        .await?;
    Ok(ApiResponse::success(json!({ "chat": chat })).with_message("Chat messages cleared"))
}

/// GET /api/chat/{chatId}/stats
pub async fn chat_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(chat_id): Path<String>,
) -> Result<ApiResponse<Value>, AppError> {
    let stats = state.chat_service.stats(&user, Some(&chat_id)).await?;
    Ok(ApiResponse::success(json!({ "stats": stats })))
}
