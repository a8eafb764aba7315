//! Credit-charged assistant messages: text Q&A, email drafting, and voice.
//!
//! Every exchange reserves its cost up front with an atomic debit. If the
//! model (or, for voice, the transcriber) fails, the reservation is refunded.
//! Once a voice message has been transcribed the charge stands even if the
//! model fails; the user gets a canned reply instead.

use chrono::Utc;
use serde::Serialize;
use tracing::{Instrument, info_span};
use uniassist_types::chat::{
    ChatMessage, EmailData, EmailMessageRequest, MessageExchange, MessageRole, TextMessageRequest,
    VoiceMessageRequest, VoiceMeta,
};
use uniassist_types::config::LlmConfig;
use uniassist_types::credit::MessageCosts;
use uniassist_types::error::{ChatError, LlmError, MessageError, TranscriptionError};
use uniassist_types::llm::{CompletionRequest, CompletionResponse};
use uniassist_types::user::User;
use uuid::Uuid;

use crate::llm::prompt::{
    self, DEFAULT_DRAFT_SUBJECT, EMPTY_EMAIL_REPLY, EMPTY_TEXT_REPLY, EMPTY_VOICE_REPLY,
    VOICE_FAILURE_REPLY,
};
use crate::llm::provider::LlmProvider;
use crate::repository::chat::ChatRepository;
use crate::repository::user::UserRepository;
use crate::service::chat::parse_chat_id;
use crate::service::validation::required;
use crate::voice::audio::parse_audio_data_url;
use crate::voice::transcriber::Transcriber;

/// What the message endpoints can currently do.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHealth {
    pub transcription: bool,
    pub transcription_service: String,
    pub llm: bool,
    pub llm_provider: String,
    pub model: String,
    pub costs: MessageCosts,
}

fn or_default_reply(content: String, fallback: &str) -> String {
    if content.trim().is_empty() {
        fallback.to_string()
    } else {
        content
    }
}

pub struct MessageService<C, U, L, T>
where
    C: ChatRepository,
    U: UserRepository,
    L: LlmProvider,
    T: Transcriber,
{
    chats: C,
    users: U,
    llm: L,
    transcriber: T,
    llm_config: LlmConfig,
    costs: MessageCosts,
}

impl<C, U, L, T> MessageService<C, U, L, T>
where
    C: ChatRepository,
    U: UserRepository,
    L: LlmProvider,
    T: Transcriber,
{
    pub fn new(
        chats: C,
        users: U,
        llm: L,
        transcriber: T,
        llm_config: LlmConfig,
        costs: MessageCosts,
    ) -> Self {
        Self {
            chats,
            users,
            llm,
            transcriber,
            llm_config,
            costs,
        }
    }

    pub fn costs(&self) -> &MessageCosts {
        &self.costs
    }

    /// Resolve a chat id the caller owns.
    async fn owned_chat(&self, owner: &User, chat_id: Option<&str>) -> Result<Uuid, MessageError> {
        let id = parse_chat_id(chat_id).map_err(|e| match e {
            ChatError::Validation(msg) => MessageError::Validation(msg),
            _ => MessageError::ChatNotFound,
        })?;
        self.chats
            .get(&id, &owner.id)
            .await?
            .map(|chat| chat.id)
            .ok_or(MessageError::ChatNotFound)
    }

    async fn complete(
        &self,
        operation: &'static str,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let span = info_span!(
            "gen_ai.complete",
            gen_ai.operation.name = operation,
            gen_ai.provider.name = self.llm.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.response.id = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );
        self.llm.complete(&request).instrument(span).await
    }

    async fn reserve(&self, owner: &User, cost: i64) -> Result<(), MessageError> {
        match self.users.try_debit(&owner.id, cost).await? {
            Some(balance) => {
                tracing::debug!(user_id = %owner.id, cost, balance, "credits reserved");
                Ok(())
            }
            None => {
                tracing::info!(user_id = %owner.id, cost, "insufficient credits");
                Err(MessageError::InsufficientCredits)
            }
        }
    }

    async fn refund(&self, owner: &User, cost: i64) {
        match self.users.credit(&owner.id, cost).await {
            Ok(balance) => {
                tracing::info!(user_id = %owner.id, cost, balance, "credits refunded");
            }
            Err(e) => {
                tracing::error!(user_id = %owner.id, cost, error = %e, "credit refund failed");
            }
        }
    }

    /// Append messages, refunding the reservation if the chat vanished or
    /// the write failed.
    async fn append_or_refund(
        &self,
        owner: &User,
        chat_id: &Uuid,
        messages: &[ChatMessage],
        cost: i64,
    ) -> Result<(), MessageError> {
        match self.chats.append_messages(chat_id, &owner.id, messages).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.refund(owner, cost).await;
                Err(MessageError::ChatNotFound)
            }
            Err(e) => {
                self.refund(owner, cost).await;
                Err(e.into())
            }
        }
    }

    async fn append_reply(&self, owner: &User, chat_id: &Uuid, reply: &ChatMessage) -> Result<(), MessageError> {
        if !self
            .chats
            .append_messages(chat_id, &owner.id, std::slice::from_ref(reply))
            .await?
        {
            tracing::warn!(chat_id = %chat_id, "chat removed before the reply was saved");
        }
        Ok(())
    }

    /// Answer a text question (costs `costs.text`).
    pub async fn text(
        &self,
        owner: &User,
        request: TextMessageRequest,
    ) -> Result<MessageExchange, MessageError> {
        let prompt = required(request.prompt.as_deref())
            .ok_or_else(|| MessageError::Validation("Prompt is required".to_string()))?
            .to_string();
        let chat_id = self.owned_chat(owner, request.chat_id.as_deref()).await?;

        let cost = self.costs.text;
        self.reserve(owner, cost).await?;

        let user_message = ChatMessage::text(MessageRole::User, prompt.clone());
        self.append_or_refund(owner, &chat_id, std::slice::from_ref(&user_message), cost)
            .await?;

        let response = match self
            .complete("text", prompt::text_request(&self.llm_config, &prompt))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(chat_id = %chat_id, error = %e, "text completion failed");
                self.refund(owner, cost).await;
                return Err(e.into());
            }
        };

        let reply = ChatMessage::text(
            MessageRole::Assistant,
            or_default_reply(response.content, EMPTY_TEXT_REPLY),
        );
        self.append_reply(owner, &chat_id, &reply).await?;

        Ok(MessageExchange {
            reply,
            user_message,
            transcription: None,
        })
    }

    /// Draft an email (costs `costs.email`).
    pub async fn email(
        &self,
        owner: &User,
        request: EmailMessageRequest,
    ) -> Result<MessageExchange, MessageError> {
        let prompt = required(request.prompt.as_deref())
            .ok_or_else(|| MessageError::Validation("Prompt is required".to_string()))?
            .to_string();
        let recipient = request.recipient.unwrap_or_default();
        let subject = request.subject.unwrap_or_default();
        let chat_id = self.owned_chat(owner, request.chat_id.as_deref()).await?;

        let cost = self.costs.email;
        self.reserve(owner, cost).await?;

        let user_message = ChatMessage::email(
            MessageRole::User,
            prompt.clone(),
            EmailData {
                recipient: recipient.clone(),
                subject: subject.clone(),
                is_sent: false,
            },
        );
        self.append_or_refund(owner, &chat_id, std::slice::from_ref(&user_message), cost)
            .await?;

        let completion = prompt::email_request(
            &self.llm_config,
            &prompt,
            Some(&recipient),
            Some(&subject),
        );
        let response = match self.complete("email", completion).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(chat_id = %chat_id, error = %e, "email completion failed");
                self.refund(owner, cost).await;
                return Err(e.into());
            }
        };

        let reply = ChatMessage::email(
            MessageRole::Assistant,
            or_default_reply(response.content, EMPTY_EMAIL_REPLY),
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
        self.append_reply(owner, &chat_id, &reply).await?;

        Ok(MessageExchange {
            reply,
            user_message,
            transcription: None,
        })
    }

    /// Transcribe a recording and answer it (costs `costs.voice`).
    pub async fn voice(
        &self,
        owner: &User,
        request: VoiceMessageRequest,
    ) -> Result<MessageExchange, MessageError> {
        let clip = parse_audio_data_url(request.audio_url.as_deref().unwrap_or_default())
            .map_err(|e| MessageError::Validation(e.to_string()))?;
        let chat_id = self.owned_chat(owner, request.chat_id.as_deref()).await?;

        let cost = self.costs.voice;
        self.reserve(owner, cost).await?;

        tracing::debug!(
            chat_id = %chat_id,
            bytes = clip.bytes.len(),
            format = clip.format.extension(),
            "transcribing voice message"
        );
        let transcript = match self.transcriber.transcribe(&clip).await {
            Ok(t) if !t.text.trim().is_empty() => t,
            Ok(_) => {
                self.refund(owner, cost).await;
                return Err(TranscriptionError::Empty.into());
            }
            Err(e) => {
                tracing::warn!(chat_id = %chat_id, error = %e, "transcription failed");
                self.refund(owner, cost).await;
                return Err(e.into());
            }
        };
        let text = transcript.text.trim().to_string();

        let user_message = ChatMessage::voice(
            text.clone(),
            VoiceMeta {
                duration: request.duration.unwrap_or_default(),
                file_size: request.file_size.unwrap_or(clip.bytes.len() as u64),
                was_transcribed: true,
                transcribed_at: Some(Utc::now()),
                transcription_service: Some(transcript.service),
                audio_format: Some(clip.format.extension().to_string()),
            },
        );
        self.append_or_refund(owner, &chat_id, std::slice::from_ref(&user_message), cost)
            .await?;

        let content = match self
            .complete("voice", prompt::voice_request(&self.llm_config, &text))
            .await
        {
            Ok(response) => or_default_reply(response.content, EMPTY_VOICE_REPLY),
            Err(e) => {
                tracing::warn!(chat_id = %chat_id, error = %e, "voice completion failed, using canned reply");
                VOICE_FAILURE_REPLY.to_string()
            }
        };
        let reply = ChatMessage::voice_reply(content);
        self.append_reply(owner, &chat_id, &reply).await?;

        Ok(MessageExchange {
            reply,
            user_message,
            transcription: Some(text),
        })
    }

    pub fn health(&self) -> MessageHealth {
        MessageHealth {
            transcription: self.transcriber.is_configured(),
            transcription_service: self.transcriber.name().to_string(),
            llm: self.llm.is_configured(),
            llm_provider: self.llm.name().to_string(),
            model: self.llm.model().to_string(),
            costs: self.costs.clone(),
        }
    }
}
