//! Chat management service (create, list, rename, clear, delete, stats).

use chrono::Utc;
use uniassist_types::chat::{
    Chat, ChatStats, CreateChatRequest, DEFAULT_CHAT_NAME, RenameChatRequest,
};
use uniassist_types::error::ChatError;
use uniassist_types::user::User;
use uuid::Uuid;

use crate::repository::chat::ChatRepository;
use crate::service::validation::required;

/// Parse a client-supplied chat id.
///
/// A missing id is a validation error. An id that is not a UUID cannot
/// name any chat, so it reads as not found.
pub fn parse_chat_id(raw: Option<&str>) -> Result<Uuid, ChatError> {
    let raw = required(raw).ok_or_else(|| ChatError::Validation("Chat ID is required".to_string()))?;
    Uuid::parse_str(raw).map_err(|_| ChatError::NotFound)
}

pub struct ChatService<C: ChatRepository> {
    chats: C,
}

impl<C: ChatRepository> ChatService<C> {
    pub fn new(chats: C) -> Self {
        Self { chats }
    }

    pub async fn create(&self, owner: &User, request: CreateChatRequest) -> Result<Chat, ChatError> {
        let now = Utc::now();
        let chat = Chat {
            id: Uuid::now_v7(),
            user_id: owner.id,
            user_name: owner.name.clone(),
            name: required(request.name.as_deref())
                .unwrap_or(DEFAULT_CHAT_NAME)
                .to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let chat = self.chats.create(&chat).await?;
        tracing::debug!(chat_id = %chat.id, user_id = %owner.id, "chat created");
        Ok(chat)
    }

    /// The owner's chats, most recently active first.
    pub async fn list(&self, owner: &User) -> Result<Vec<Chat>, ChatError> {
        Ok(self.chats.list_for_user(&owner.id).await?)
    }

    pub async fn get(&self, owner: &User, chat_id: Option<&str>) -> Result<Chat, ChatError> {
        let id = parse_chat_id(chat_id)?;
        self.chats
            .get(&id, &owner.id)
            .await?
            .ok_or(ChatError::NotFound)
    }

    pub async fn delete(&self, owner: &User, chat_id: Option<&str>) -> Result<(), ChatError> {
        let id = parse_chat_id(chat_id)?;
        if !self.chats.delete(&id, &owner.id).await? {
            return Err(ChatError::NotFound);
        }
        tracing::debug!(chat_id = %id, user_id = %owner.id, "chat deleted");
        Ok(())
    }

    pub async fn rename(&self, owner: &User, request: RenameChatRequest) -> Result<Chat, ChatError> {
        let name = required(request.name.as_deref())
            .ok_or_else(|| ChatError::Validation("Chat name is required".to_string()))?;
        let id = parse_chat_id(request.chat_id.as_deref())?;
        if !self.chats.rename(&id, &owner.id, name).await? {
            return Err(ChatError::NotFound);
        }
        self.get(owner, request.chat_id.as_deref()).await
    }

    /// Remove every message but keep the chat itself.
    pub async fn clear(&self, owner: &User, chat_id: Option<&str>) -> Result<Chat, ChatError> {
        let id = parse_chat_id(chat_id)?;
        if !self.chats.clear_messages(&id, &owner.id).await? {
            return Err(ChatError::NotFound);
        }
        self.get(owner, chat_id).await
    }

    pub async fn stats(&self, owner: &User, chat_id: Option<&str>) -> Result<ChatStats, ChatError> {
        let chat = self.get(owner, chat_id).await?;
        Ok(ChatStats::from_messages(&chat.messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryChats, user};
    use uniassist_types::chat::{ChatIdRequest, ChatMessage, VoiceMeta};

    fn service() -> (ChatService<MemoryChats>, MemoryChats) {
        let chats = MemoryChats::default();
        (ChatService::new(chats.clone()), chats)
    }

    #[test]
    fn test_parse_chat_id() {
        assert!(matches!(parse_chat_id(None), Err(ChatError::Validation(_))));
        assert!(matches!(parse_chat_id(Some("  ")), Err(ChatError::Validation(_))));
        assert!(matches!(parse_chat_id(Some("64f0c2e1a9")), Err(ChatError::NotFound)));
        let id = Uuid::now_v7();
        assert_eq!(parse_chat_id(Some(&id.to_string())).unwrap(), id);
    }

    #[tokio::test]
    async fn test_create_defaults_name() {
        let (svc, _) = service();
        let owner = user("a@b.com", 10);
        let chat = svc.create(&owner, CreateChatRequest::default()).await.unwrap();
        assert_eq!(chat.name, "New Chat");
        assert_eq!(chat.user_name, owner.name);
        assert!(chat.messages.is_empty());

        let named = svc
            .create(
                &owner,
                CreateChatRequest {
                    name: Some(" Finals prep ".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(named.name, "Finals prep");
    }

    #[tokio::test]
    async fn test_other_users_chats_are_invisible() {
        let (svc, _) = service();
        let alice = user("alice@b.com", 10);
        let bob = user("bob@b.com", 10);
        let chat = svc.create(&alice, CreateChatRequest::default()).await.unwrap();
        let id = chat.id.to_string();

        assert!(matches!(svc.get(&bob, Some(&id)).await, Err(ChatError::NotFound)));
        assert!(matches!(svc.delete(&bob, Some(&id)).await, Err(ChatError::NotFound)));
        assert!(svc.list(&bob).await.unwrap().is_empty());
        assert_eq!(svc.list(&alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_list() {
        let (svc, _) = service();
        let owner = user("a@b.com", 10);
        let chat = svc.create(&owner, CreateChatRequest::default()).await.unwrap();
        let req = ChatIdRequest {
            chat_id: Some(chat.id.to_string()),
        };
        svc.delete(&owner, req.chat_id.as_deref()).await.unwrap();
        assert!(svc.list(&owner).await.unwrap().is_empty());
        assert!(matches!(
            svc.delete(&owner, req.chat_id.as_deref()).await,
            Err(ChatError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_rename() {
        let (svc, _) = service();
        let owner = user("a@b.com", 10);
        let chat = svc.create(&owner, CreateChatRequest::default()).await.unwrap();

        let blank = svc
            .rename(
                &owner,
                RenameChatRequest {
                    chat_id: Some(chat.id.to_string()),
                    name: Some("   ".to_string()),
                },
            )
            .await;
        assert!(matches!(blank, Err(ChatError::Validation(_))));

        let renamed = svc
            .rename(
                &owner,
                RenameChatRequest {
                    chat_id: Some(chat.id.to_string()),
                    name: Some("  Timetable ".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Timetable");

        let missing = svc
            .rename(
                &owner,
                RenameChatRequest {
                    chat_id: Some(Uuid::now_v7().to_string()),
                    name: Some("x".to_string()),
                },
            )
            .await;
        assert!(matches!(missing, Err(ChatError::NotFound)));
    }

    #[tokio::test]
    async fn test_clear_and_stats() {
        let (svc, chats) = service();
        let owner = user("a@b.com", 10);
        let chat = svc.create(&owner, CreateChatRequest::default()).await.unwrap();
        chats
            .append_messages(
                &chat.id,
                &owner.id,
                &[
                    ChatMessage::voice("hello", VoiceMeta::default()),
                    ChatMessage::voice_reply("hi"),
                ],
            )
            .await
            .unwrap();

        let id = chat.id.to_string();
        let stats = svc.stats(&owner, Some(&id)).await.unwrap();
        assert_eq!(stats.total_messages, 2);
        assert_eq!(stats.voice_messages, 1);
        assert_eq!(stats.ai_messages, 1);

        let cleared = svc.clear(&owner, Some(&id)).await.unwrap();
        assert!(cleared.messages.is_empty());
        assert_eq!(cleared.id, chat.id);
        assert_eq!(svc.stats(&owner, Some(&id)).await.unwrap(), ChatStats::default());
    }
}
