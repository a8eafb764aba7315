//! ChatRepository trait definition.
//!
//! Every lookup is scoped by owner: a chat that exists but belongs to a
//! different user is indistinguishable from one that does not exist.
//! Follows the same RPITIT pattern as UserRepository.

use uniassist_types::chat::{Chat, ChatMessage};
use uniassist_types::error::RepositoryError;
use uniassist_types::user::UserId;
use uuid::Uuid;

/// Repository trait for chats and their ordered messages.
///
/// Implementations live in uniassist-infra (e.g., `SqliteChatRepository`).
pub trait ChatRepository: Send + Sync {
    /// Create a new chat (messages are ignored; new chats start empty).
    fn create(
        &self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<Chat, RepositoryError>> + Send;

    /// Get a chat with its messages in insertion order.
    fn get(
        &self,
        id: &Uuid,
        owner: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// All chats for a user with messages, ordered by `updated_at` DESC.
    fn list_for_user(
        &self,
        owner: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, RepositoryError>> + Send;

    /// Delete a chat and its messages. Returns whether anything was removed.
    fn delete(
        &self,
        id: &Uuid,
        owner: &UserId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Rename a chat. Returns whether the chat was found.
    fn rename(
        &self,
        id: &Uuid,
        owner: &UserId,
        name: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Remove all messages, keeping the chat. Returns whether the chat was found.
    fn clear_messages(
        &self,
        id: &Uuid,
        owner: &UserId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Append messages after the existing ones and bump `updated_at`.
    /// Returns whether the chat was found.
    fn append_messages(
        &self,
        id: &Uuid,
        owner: &UserId,
        messages: &[ChatMessage],
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    fn count(&self) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;
}
