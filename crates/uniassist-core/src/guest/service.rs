//! Guest chat service.
//!
//! Answers come from the knowledge base. When it is unreachable the guest
//! still gets a reply (a fixed apology) so the conversation never errors out.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uniassist_types::chat::{ChatMessage, EmailData, MessageRole, VoiceMeta};
use uniassist_types::error::GuestError;
use uniassist_types::guest::{
    CleanupStats, GuestChatRequest, GuestEmailRequest, GuestHistory, GuestReply,
    GuestVoiceRequest, ReplySource,
};

use crate::guest::knowledge::KnowledgeBase;
use crate::guest::store::GuestSessionStore;
use crate::llm::prompt::{DEFAULT_DRAFT_SUBJECT, guest_email_question};
use crate::voice::audio::parse_audio_data_url;
use crate::voice::transcriber::Transcriber;

const CHAT_FALLBACK: &str = "Sorry, I'm unable to connect to the university knowledge base at the moment. Please try again later.";
const VOICE_FALLBACK: &str = "I received your voice message, but I'm having trouble accessing the knowledge base. Please try again or use text input.";
const EMAIL_FALLBACK: &str = "Sorry, I'm unable to draft emails at the moment. Please try again later.";

const CHAT_NOTE: &str = "Guest users have unlimited text messages. Sign up for voice chat, email drafting, and saved chat history.";
const VOICE_NOTE: &str = "Guest users have unlimited text and voice messages. Sign up for email drafting and saved chat history.";
const EMAIL_NOTE: &str = "Guest email drafting is available. Sign up to send emails and save them to your account.";

/// Status of the guest backends.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestHealth {
    pub knowledge_base: bool,
    pub knowledge_base_url: String,
    pub transcriber: bool,
    pub guest_sessions: usize,
    pub session_expiry_minutes: i64,
    pub timestamp: DateTime<Utc>,
}

pub struct GuestService<K: KnowledgeBase, T: Transcriber> {
    knowledge: K,
    transcriber: T,
    store: GuestSessionStore,
}

fn session_id_or_new(session_id: Option<String>, now: DateTime<Utc>) -> String {
    session_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| GuestSessionStore::generate_id(now))
}

fn required_session_id(session_id: Option<&str>) -> Result<&str, GuestError> {
    session_id
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GuestError::Validation("Session ID is required.".to_string()))
}

impl<K: KnowledgeBase, T: Transcriber> GuestService<K, T> {
    pub fn new(knowledge: K, transcriber: T, store: GuestSessionStore) -> Self {
        Self {
            knowledge,
            transcriber,
            store,
        }
    }

    pub fn store(&self) -> &GuestSessionStore {
        &self.store
    }

    /// Ask the knowledge base, substituting `fallback` on any failure.
    async fn answer(&self, question: &str, fallback: &str) -> (String, ReplySource) {
        match self.knowledge.ask(question).await {
            Ok(answer) if !answer.trim().is_empty() => (answer, ReplySource::KnowledgeBase),
            Ok(_) => {
                tracing::warn!("knowledge base returned an empty answer");
                (fallback.to_string(), ReplySource::Fallback)
            }
            Err(e) => {
                tracing::warn!(error = %e, "knowledge base request failed, using fallback reply");
                (fallback.to_string(), ReplySource::Fallback)
            }
        }
    }

    pub async fn chat(&self, request: GuestChatRequest) -> Result<GuestReply, GuestError> {
        let message = request
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                GuestError::Validation(
                    "Message is required and must be a non-empty string.".to_string(),
                )
            })?
            .to_string();

        let now = Utc::now();
        let session_id = session_id_or_new(request.session_id, now);
        self.store.append(
            &session_id,
            [ChatMessage::text(MessageRole::User, message.clone())],
            now,
        );

        let (answer, source) = self.answer(&message, CHAT_FALLBACK).await;
        let reply = ChatMessage::text(MessageRole::Assistant, answer);
        let count = self.store.append(&session_id, [reply.clone()], Utc::now());

        tracing::debug!(session_id = %session_id, ?source, "guest chat answered");
        Ok(GuestReply {
            reply,
            session_id,
            total_messages: count / 2,
            source,
            note: CHAT_NOTE,
            transcription: None,
        })
    }

    pub async fn voice(&self, request: GuestVoiceRequest) -> Result<GuestReply, GuestError> {
        let clip = parse_audio_data_url(request.audio_url.as_deref().unwrap_or_default())
            .map_err(|e| GuestError::Validation(e.to_string()))?;

        if !self.transcriber.is_configured() {
            return Err(GuestError::TranscriptionUnavailable);
        }

        let transcript = self.transcriber.transcribe(&clip).await.map_err(|e| {
            tracing::warn!(error = %e, "guest transcription failed");
            GuestError::TranscriptionUnavailable
        })?;

        let text = transcript.text.trim().to_string();
        if text.is_empty() {
            return Err(GuestError::Validation(
                "No speech detected in your recording. Please speak clearly and try again."
                    .to_string(),
            ));
        }

        let now = Utc::now();
        let session_id = session_id_or_new(request.session_id, now);
        let user_message = ChatMessage::voice(
            text.clone(),
            VoiceMeta {
                duration: request.duration.unwrap_or_default(),
                file_size: request.file_size.unwrap_or(clip.bytes.len() as u64),
                was_transcribed: true,
                transcribed_at: Some(now),
                transcription_service: Some(transcript.service),
                audio_format: Some(clip.format.extension().to_string()),
            },
        );
        self.store.append(&session_id, [user_message], now);

        let (answer, source) = self.answer(&text, VOICE_FALLBACK).await;
        let reply = ChatMessage::voice_reply(answer);
        let count = self.store.append(&session_id, [reply.clone()], Utc::now());

        Ok(GuestReply {
            reply,
            session_id,
            total_messages: count / 2,
            source,
            note: VOICE_NOTE,
            transcription: Some(text),
        })
    }

    pub async fn email(&self, request: GuestEmailRequest) -> Result<GuestReply, GuestError> {
        let prompt = request
            .prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                GuestError::Validation("Prompt is required for email drafting.".to_string())
            })?
            .to_string();
        let recipient = request.recipient.unwrap_or_default();
        let subject = request.subject.unwrap_or_default();

        let now = Utc::now();
        let session_id = session_id_or_new(request.session_id, now);
        self.store.append(
            &session_id,
            [ChatMessage::email(
                MessageRole::User,
                prompt.clone(),
                EmailData {
                    recipient: recipient.clone(),
                    subject: subject.clone(),
                    is_sent: false,
                },
            )],
            now,
        );

        let question = guest_email_question(&prompt, Some(&recipient), Some(&subject));
        let (answer, source) = self.answer(&question, EMAIL_FALLBACK).await;
        let reply = ChatMessage::email(
            MessageRole::Assistant,
            answer,
            EmailData {
                recipient,
                subject: if subject.is_empty() {
                    DEFAULT_DRAFT_SUBJECT.to_string()
                } else {
                    subject
                },
                is_sent: false,
            },
        );
        let count = self.store.append(&session_id, [reply.clone()], Utc::now());

        Ok(GuestReply {
            reply,
            session_id,
            total_messages: count / 2,
            source,
            note: EMAIL_NOTE,
            transcription: None,
        })
    }

    pub fn history(&self, session_id: Option<&str>) -> Result<GuestHistory, GuestError> {
        self.history_at(session_id, Utc::now())
    }

    pub fn history_at(
        &self,
        session_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<GuestHistory, GuestError> {
        let id = required_session_id(session_id)?;
        let session = self.store.get(id, now).ok_or(GuestError::SessionNotFound)?;
        let idle = now - session.last_activity;
        Ok(GuestHistory {
            session_id: session.id,
            message_count: session.messages.len(),
            messages: session.messages,
            created_at: session.created_at.timestamp_millis(),
            last_activity: session.last_activity.timestamp_millis(),
            session_age: (now - session.created_at).num_milliseconds(),
            will_expire_in: (self.store.ttl() - idle).num_milliseconds(),
        })
    }

    /// Drop a session. Clearing an unknown session is not an error.
    pub fn clear(&self, session_id: Option<&str>) -> Result<bool, GuestError> {
        let id = required_session_id(session_id)?;
        Ok(self.store.remove(id))
    }

    pub fn cleanup(&self) -> CleanupStats {
        let stats = self.store.sweep_expired(Utc::now());
        if stats.cleaned > 0 {
            tracing::info!(cleaned = stats.cleaned, remaining = stats.after, "swept expired guest sessions");
        }
        stats
    }

    pub async fn health(&self) -> GuestHealth {
        GuestHealth {
            knowledge_base: self.knowledge.probe().await,
            knowledge_base_url: self.knowledge.endpoint().to_string(),
            transcriber: self.transcriber.is_configured(),
            guest_sessions: self.store.len(),
            session_expiry_minutes: self.store.ttl().num_minutes(),
            timestamp: Utc::now(),
        }
    }
}
