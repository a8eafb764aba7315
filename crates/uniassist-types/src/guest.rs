//! Guest session types.
//!
//! Guest sessions live only in process memory and are never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;

/// An unauthenticated conversation held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct GuestSession {
    pub id: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl GuestSession {
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }

    /// Number of user/assistant exchanges, counted as messages halved.
    pub fn exchanges(&self) -> usize {
        self.messages.len() / 2
    }
}

/// Where a guest reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    KnowledgeBase,
    Fallback,
}

/// Body of `POST /api/guest/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Body of `POST /api/guest/voice`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestVoiceRequest {
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Body of `POST /api/guest/email`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestEmailRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Body of `POST /api/guest/clear` and query of `GET /api/guest/history`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSessionRef {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Result of a guest exchange.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestReply {
    pub reply: ChatMessage,
    pub session_id: String,
    pub total_messages: usize,
    pub source: ReplySource,
    pub note: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
}

/// Snapshot of a guest session for the history endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestHistory {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub last_activity: i64,
    pub message_count: usize,
    /// Milliseconds since the session was created.
    pub session_age: i64,
    /// Milliseconds until the session expires if left idle.
    pub will_expire_in: i64,
}

/// Counts reported by a sweep of expired sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanupStats {
    pub before: usize,
    pub after: usize,
    pub cleaned: usize,
}
