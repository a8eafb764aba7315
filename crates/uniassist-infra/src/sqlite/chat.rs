//! SQLite chat repository implementation.
//!
//! Chats live in `chats`; their messages live in `chat_messages`, ordered by
//! a per-chat `position`. Every statement is scoped by `user_id`, so a chat
//! owned by someone else behaves exactly like a missing one.

use chrono::Utc;
use sqlx::Row;
use uniassist_core::repository::chat::ChatRepository;
use uniassist_types::chat::{Chat, ChatMessage, EmailData, MessageKind, MessageRole, VoiceMeta};
use uniassist_types::error::RepositoryError;
use uniassist_types::user::UserId;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatRow {
    id: String,
    user_id: String,
    user_name: String,
    name: String,
    created_at: String,
    updated_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            user_name: row.try_get("user_name")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_chat(self, messages: Vec<ChatMessage>) -> Result<Chat, RepositoryError> {
        Ok(Chat {
            id: Uuid::parse_str(&self.id)
                .map_err(|e| RepositoryError::Query(format!("invalid chat id: {e}")))?,
            user_id: self
                .user_id
                .parse()
                .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?,
            user_name: self.user_name,
            name: self.name,
            messages,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct MessageRow {
    kind: String,
    role: String,
    content: String,
    email_data: Option<String>,
    voice_meta: Option<String>,
    is_voice_response: bool,
    timestamp: i64,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            kind: row.try_get("kind")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            email_data: row.try_get("email_data")?,
            voice_meta: row.try_get("voice_meta")?,
            is_voice_response: row.try_get("is_voice_response")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let kind: MessageKind = self.kind.parse().map_err(RepositoryError::Query)?;
        let role: MessageRole = self.role.parse().map_err(RepositoryError::Query)?;
        let email_data: Option<EmailData> = self
            .email_data
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid email_data JSON: {e}")))?;
        let voice_meta: Option<VoiceMeta> = self
            .voice_meta
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid voice_meta JSON: {e}")))?;

        Ok(ChatMessage {
            kind,
            role,
            content: self.content,
            email_data,
            voice_meta,
            is_voice_response: self.is_voice_response,
            timestamp: self.timestamp,
        })
    }
}

fn to_json<T: serde::Serialize>(value: Option<&T>) -> Result<Option<String>, RepositoryError> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| RepositoryError::Query(e.to_string()))
}

impl SqliteChatRepository {
    async fn load_messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM chat_messages WHERE chat_id = ? ORDER BY position ASC")
            .bind(chat_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                MessageRow::from_row(row)
                    .map_err(query_error)
                    .and_then(MessageRow::into_message)
            })
            .collect()
    }

    async fn hydrate(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Chat, RepositoryError> {
        let chat_row = ChatRow::from_row(row).map_err(query_error)?;
        let messages = self.load_messages(&chat_row.id).await?;
        chat_row.into_chat(messages)
    }

    /// Bump `updated_at` on an owned chat. Returns whether it matched.
    async fn touch<'e, E>(executor: E, id: &Uuid, owner: &UserId) -> Result<bool, RepositoryError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let result = sqlx::query("UPDATE chats SET updated_at = ? WHERE id = ? AND user_id = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(id.to_string())
            .bind(owner.to_string())
            .execute(executor)
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected() > 0)
    }
}

impl ChatRepository for SqliteChatRepository {
    async fn create(&self, chat: &Chat) -> Result<Chat, RepositoryError> {
        sqlx::query(
            "INSERT INTO chats (id, user_id, user_name, name, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(chat.id.to_string())
        .bind(chat.user_id.to_string())
        .bind(&chat.user_name)
        .bind(&chat.name)
        .bind(format_datetime(&chat.created_at))
        .bind(format_datetime(&chat.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.message().contains("FOREIGN KEY") {
                    return RepositoryError::NotFound;
                }
            }
            query_error(e)
        })?;

        Ok(Chat {
            messages: Vec::new(),
            ..chat.clone()
        })
    }

    async fn get(&self, id: &Uuid, owner: &UserId) -> Result<Option<Chat>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chats WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(owner.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, owner: &UserId) -> Result<Vec<Chat>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM chats WHERE user_id = ? ORDER BY updated_at DESC")
            .bind(owner.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut chats = Vec::with_capacity(rows.len());
        for row in &rows {
            chats.push(self.hydrate(row).await?);
        }
        Ok(chats)
    }

    async fn delete(&self, id: &Uuid, owner: &UserId) -> Result<bool, RepositoryError> {
        // chat_messages rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM chats WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(owner.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn rename(&self, id: &Uuid, owner: &UserId, name: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE chats SET name = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(name)
        .bind(format_datetime(&Utc::now()))
        .bind(id.to_string())
        .bind(owner.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_messages(&self, id: &Uuid, owner: &UserId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        if !Self::touch(&mut *tx, id, owner).await? {
            return Ok(false);
        }
        sqlx::query("DELETE FROM chat_messages WHERE chat_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(true)
    }

    async fn append_messages(
        &self,
        id: &Uuid,
        owner: &UserId,
        messages: &[ChatMessage],
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        if !Self::touch(&mut *tx, id, owner).await? {
            return Ok(false);
        }

        let (next,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM chat_messages WHERE chat_id = ?",
        )
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(query_error)?;

        for (offset, message) in messages.iter().enumerate() {
            sqlx::query(
                "INSERT INTO chat_messages (chat_id, position, kind, role, content, email_data, voice_meta, is_voice_response, timestamp)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(id.to_string())
            .bind(next + offset as i64)
            .bind(message.kind.to_string())
            .bind(message.role.to_string())
            .bind(&message.content)
            .bind(to_json(message.email_data.as_ref())?)
            .bind(to_json(message.voice_meta.as_ref())?)
            .bind(message.is_voice_response)
            .bind(message.timestamp)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }

        tx.commit().await.map_err(query_error)?;
        Ok(true)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chats")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(row.0)
    }
}
