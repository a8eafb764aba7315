//! Chat, message, and statistics types for UniAssist.
//!
//! A chat belongs to one user and holds an ordered list of messages. Each
//! message is tagged with the kind of interaction that produced it
//! (plain text, email drafting, or a transcribed voice note).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

pub use crate::llm::MessageRole;
use crate::user::UserId;

/// Name given to chats created without one.
pub const DEFAULT_CHAT_NAME: &str = "New Chat";

/// What kind of interaction produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Email,
    Voice,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::Email => write!(f, "email"),
            MessageKind::Voice => write!(f, "voice"),
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(MessageKind::Text),
            "email" => Ok(MessageKind::Email),
            "voice" => Ok(MessageKind::Voice),
            other => Err(format!("invalid message kind: '{other}'")),
        }
    }
}

/// Addressing data attached to email-drafting messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailData {
    pub recipient: String,
    pub subject: String,
    #[serde(default)]
    pub is_sent: bool,
}

/// Metadata describing the recording behind a voice message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceMeta {
    /// Recording length in seconds, as reported by the client.
    pub duration: f64,
    /// Recording size in bytes, as reported by the client.
    pub file_size: u64,
    pub was_transcribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcribed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_format: Option<String>,
}

/// A single message within a chat or guest session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_data: Option<EmailData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_meta: Option<VoiceMeta>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_voice_response: bool,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ChatMessage {
    /// A plain text message stamped with the current time.
    pub fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            role,
            content: content.into(),
            email_data: None,
            voice_meta: None,
            is_voice_response: false,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// An email-drafting message.
    pub fn email(role: MessageRole, content: impl Into<String>, email_data: EmailData) -> Self {
        Self {
            kind: MessageKind::Email,
            email_data: Some(email_data),
            ..Self::text(role, content)
        }
    }

    /// A user voice message carrying its transcript as content.
    pub fn voice(content: impl Into<String>, voice_meta: VoiceMeta) -> Self {
        Self {
            kind: MessageKind::Voice,
            voice_meta: Some(voice_meta),
            ..Self::text(MessageRole::User, content)
        }
    }

    /// An assistant reply to a voice message.
    pub fn voice_reply(content: impl Into<String>) -> Self {
        Self {
            is_voice_response: true,
            ..Self::text(MessageRole::Assistant, content)
        }
    }
}

/// A persisted conversation owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: UserId,
    pub user_name: String,
    pub name: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-chat message counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStats {
    pub total_messages: u32,
    pub voice_messages: u32,
    pub email_messages: u32,
    pub text_messages: u32,
    pub user_messages: u32,
    pub ai_messages: u32,
}

impl ChatStats {
    pub fn from_messages(messages: &[ChatMessage]) -> Self {
        messages.iter().fold(Self::default(), |mut acc, message| {
            acc.total_messages += 1;
            match message.kind {
                MessageKind::Voice => acc.voice_messages += 1,
                MessageKind::Email => acc.email_messages += 1,
                MessageKind::Text => acc.text_messages += 1,
            }
            match message.role {
                MessageRole::User => acc.user_messages += 1,
                MessageRole::Assistant => acc.ai_messages += 1,
                MessageRole::System => {}
            }
            acc
        })
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/chat/create`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateChatRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `DELETE /api/chat/delete` and `POST /api/chat/clear`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatIdRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
}

/// Body of `PUT /api/chat/rename`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameChatRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `POST /api/message/text`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Body of `POST /api/message/email`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessageRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

/// Body of `POST /api/message/voice`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceMessageRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
    /// `data:audio/<type>;base64,<payload>`
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Outcome of a successful message exchange.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageExchange {
    pub reply: ChatMessage,
    pub user_message: ChatMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
}
