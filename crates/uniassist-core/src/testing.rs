//! In-memory implementations of the core ports, shared by service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uniassist_types::chat::{Chat, ChatMessage};
use uniassist_types::credit::{CheckoutRequest, CheckoutSession, Transaction};
use uniassist_types::error::{
    AuthError, LlmError, MailError, PaymentError, RepositoryError, TranscriptionError,
};
use uniassist_types::llm::{CompletionRequest, CompletionResponse, Transcript, Usage};
use uniassist_types::user::{User, UserId};
use uuid::Uuid;

use crate::llm::provider::LlmProvider;
use crate::mail::{Mailer, OutgoingMail};
use crate::payment::{PaymentEvent, PaymentGateway};
use crate::repository::chat::ChatRepository;
use crate::repository::transaction::TransactionRepository;
use crate::repository::user::UserRepository;
use crate::service::hash::{ContentHasher, PasswordHasher};
use crate::service::token::TokenIssuer;
use crate::voice::audio::AudioClip;
use crate::voice::transcriber::Transcriber;

// --- Hashers and tokens ---

/// "Hashes" by reversing the input. Distinct from the input, deterministic.
pub struct ReverseHasher;

impl ContentHasher for ReverseHasher {
    fn compute_hash(&self, content: &str) -> String {
        format!("h:{}", content.chars().rev().collect::<String>())
    }
}

pub struct PlainPasswords;

impl PasswordHasher for PlainPasswords {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain${password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        hash == format!("plain${password}")
    }
}

/// Tokens are `tok:<user id>`.
pub struct FakeTokens;

impl TokenIssuer for FakeTokens {
    fn issue(&self, user_id: &UserId) -> Result<String, AuthError> {
        Ok(format!("tok:{user_id}"))
    }

    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        token
            .strip_prefix("tok:")
            .and_then(|id| id.parse().ok())
            .ok_or(AuthError::Unauthorized)
    }
}

// --- Repositories ---

#[derive(Clone, Default)]
pub struct MemoryUsers {
    pub users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl MemoryUsers {
    pub fn by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn credits(&self, id: &UserId) -> i64 {
        self.users.lock().unwrap()[id].credits
    }
}

impl UserRepository for MemoryUsers {
    fn create(&self, user: &User) -> impl Future<Output = Result<User, RepositoryError>> + Send {
        let mut users = self.users.lock().unwrap();
        let result = if users.values().any(|u| u.email == user.email) {
            Err(RepositoryError::Conflict(user.email.clone()))
        } else {
            users.insert(user.id, user.clone());
            Ok(user.clone())
        };
        async move { result }
    }

    fn get_by_id(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send {
        let result = self.users.lock().unwrap().get(id).cloned();
        async move { Ok(result) }
    }

    fn get_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send {
        let result = self.by_email(email);
        async move { Ok(result) }
    }

    fn update(&self, user: &User) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        let mut users = self.users.lock().unwrap();
        let result = match users.get_mut(&user.id) {
            Some(existing) => {
                let credits = existing.credits;
                *existing = user.clone();
                existing.credits = credits;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        };
        async move { result }
    }

    fn delete(&self, id: &UserId) -> impl Future<Output = Result<bool, RepositoryError>> + Send {
        let removed = self.users.lock().unwrap().remove(id).is_some();
        async move { Ok(removed) }
    }

    fn try_debit(
        &self,
        id: &UserId,
        amount: i64,
    ) -> impl Future<Output = Result<Option<i64>, RepositoryError>> + Send {
        let mut users = self.users.lock().unwrap();
        let result = users.get_mut(id).and_then(|u| {
            (u.credits >= amount).then(|| {
                u.credits -= amount;
                u.credits
            })
        });
        async move { Ok(result) }
    }

    fn credit(
        &self,
        id: &UserId,
        amount: i64,
    ) -> impl Future<Output = Result<i64, RepositoryError>> + Send {
        let mut users = self.users.lock().unwrap();
        let result = match users.get_mut(id) {
            Some(u) => {
                u.credits += amount;
                Ok(u.credits)
            }
            None => Err(RepositoryError::NotFound),
        };
        async move { result }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<User>, RepositoryError>> + Send {
        let users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        async move { Ok(users) }
    }

    fn count(&self) -> impl Future<Output = Result<i64, RepositoryError>> + Send {
        let n = self.users.lock().unwrap().len() as i64;
        async move { Ok(n) }
    }
}

#[derive(Clone, Default)]
pub struct MemoryChats {
    pub chats: Arc<Mutex<Vec<Chat>>>,
}

impl MemoryChats {
    fn with_owned<R>(&self, id: &Uuid, owner: &UserId, f: impl FnOnce(&mut Chat) -> R) -> Option<R> {
        let mut chats = self.chats.lock().unwrap();
        chats
            .iter_mut()
            .find(|c| c.id == *id && c.user_id == *owner)
            .map(f)
    }

    pub fn messages(&self, id: &Uuid) -> Vec<ChatMessage> {
        self.chats
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == *id)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }
}

impl ChatRepository for MemoryChats {
    fn create(&self, chat: &Chat) -> impl Future<Output = Result<Chat, RepositoryError>> + Send {
        let mut stored = chat.clone();
        stored.messages.clear();
        self.chats.lock().unwrap().push(stored.clone());
        async move { Ok(stored) }
    }

    fn get(
        &self,
        id: &Uuid,
        owner: &UserId,
    ) -> impl Future<Output = Result<Option<Chat>, RepositoryError>> + Send {
        let result = self.with_owned(id, owner, |c| c.clone());
        async move { Ok(result) }
    }

    fn list_for_user(
        &self,
        owner: &UserId,
    ) -> impl Future<Output = Result<Vec<Chat>, RepositoryError>> + Send {
        let mut chats: Vec<Chat> = self
            .chats
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == *owner)
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        async move { Ok(chats) }
    }

    fn delete(
        &self,
        id: &Uuid,
        owner: &UserId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send {
        let mut chats = self.chats.lock().unwrap();
        let before = chats.len();
        chats.retain(|c| !(c.id == *id && c.user_id == *owner));
        let removed = chats.len() != before;
        async move { Ok(removed) }
    }

    fn rename(
        &self,
        id: &Uuid,
        owner: &UserId,
        name: &str,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send {
        let found = self
            .with_owned(id, owner, |c| {
                c.name = name.to_string();
                c.updated_at = Utc::now();
            })
            .is_some();
        async move { Ok(found) }
    }

    fn clear_messages(
        &self,
        id: &Uuid,
        owner: &UserId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send {
        let found = self
            .with_owned(id, owner, |c| {
                c.messages.clear();
                c.updated_at = Utc::now();
            })
            .is_some();
        async move { Ok(found) }
    }

    fn append_messages(
        &self,
        id: &Uuid,
        owner: &UserId,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send {
        let found = self
            .with_owned(id, owner, |c| {
                c.messages.extend_from_slice(messages);
                c.updated_at = Utc::now();
            })
            .is_some();
        async move { Ok(found) }
    }

    fn count(&self) -> impl Future<Output = Result<i64, RepositoryError>> + Send {
        let n = self.chats.lock().unwrap().len() as i64;
        async move { Ok(n) }
    }
}

/// Transactions; `fulfill` credits through the shared `MemoryUsers`.
#[derive(Clone, Default)]
pub struct MemoryTransactions {
    pub transactions: Arc<Mutex<HashMap<Uuid, Transaction>>>,
    pub users: MemoryUsers,
}

impl TransactionRepository for MemoryTransactions {
    fn create(
        &self,
        transaction: &Transaction,
    ) -> impl Future<Output = Result<Transaction, RepositoryError>> + Send {
        self.transactions
            .lock()
            .unwrap()
            .insert(transaction.id, transaction.clone());
        let stored = transaction.clone();
        async move { Ok(stored) }
    }

    fn get(
        &self,
        id: &Uuid,
    ) -> impl Future<Output = Result<Option<Transaction>, RepositoryError>> + Send {
        let result = self.transactions.lock().unwrap().get(id).cloned();
        async move { Ok(result) }
    }

    fn fulfill(
        &self,
        id: &Uuid,
    ) -> impl Future<Output = Result<Option<Transaction>, RepositoryError>> + Send {
        let mut transactions = self.transactions.lock().unwrap();
        let result = match transactions.get_mut(id) {
            None => Err(RepositoryError::NotFound),
            Some(tx) if tx.is_paid => Ok(None),
            Some(tx) => {
                tx.is_paid = true;
                let mut users = self.users.users.lock().unwrap();
                if let Some(u) = users.get_mut(&tx.user_id) {
                    u.credits += tx.credits;
                }
                Ok(Some(tx.clone()))
            }
        };
        async move { result }
    }
}

// --- External services ---

/// Records every mail; fails every send when `fail` is set.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<OutgoingMail>>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn last(&self) -> Option<OutgoingMail> {
        self.sent.lock().unwrap().last().cloned()
    }

    /// The six-digit code inside the most recent mail.
    pub fn last_code(&self) -> Option<String> {
        let html = self.last()?.html;
        html.split(|c: char| !c.is_ascii_digit())
            .find(|s| s.len() == 6)
            .map(str::to_string)
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, mail: &OutgoingMail) -> impl Future<Output = Result<(), MailError>> + Send {
        let result = if self.fail {
            Err(MailError::Transport("smtp down".to_string()))
        } else {
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        };
        async move { result }
    }
}

/// Echoes the prompt, or fails when `fail` is set.
pub struct EchoLlm {
    pub reply: Option<String>,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl EchoLlm {
    pub fn ok(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            requests: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            requests: Arc::default(),
        }
    }
}

impl LlmProvider for EchoLlm {
    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-1"
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let result = match &self.reply {
            Some(reply) => Ok(CompletionResponse {
                id: "resp-1".to_string(),
                content: reply.clone(),
                model: "echo-1".to_string(),
                usage: Usage::default(),
            }),
            None => Err(LlmError::Provider {
                message: "upstream 500".to_string(),
            }),
        };
        async move { result }
    }
}

pub struct FixedTranscriber {
    pub text: Option<String>,
}

impl Transcriber for FixedTranscriber {
    fn name(&self) -> &str {
        "fixed"
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn transcribe(
        &self,
        _clip: &AudioClip,
    ) -> impl Future<Output = Result<Transcript, TranscriptionError>> + Send {
        let result = match &self.text {
            Some(text) => Ok(Transcript {
                text: text.clone(),
                language_code: Some("en".to_string()),
                service: "fixed".to_string(),
            }),
            None => Err(TranscriptionError::Failed("audio unreadable".to_string())),
        };
        async move { result }
    }
}

/// Accepts any signature equal to `"valid"`; the payload is
/// `<event type>|<transaction id>`.
pub struct FakeGateway {
    pub configured: bool,
}

impl PaymentGateway for FakeGateway {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> impl Future<Output = Result<CheckoutSession, PaymentError>> + Send {
        let result = if self.configured {
            Ok(CheckoutSession {
                id: format!("cs_{}", request.transaction_id),
                url: format!("https://pay.test/{}", request.transaction_id),
            })
        } else {
            Err(PaymentError::NotConfigured)
        };
        async move { result }
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
        _now: DateTime<Utc>,
    ) -> Result<PaymentEvent, PaymentError> {
        if signature_header != "valid" {
            return Err(PaymentError::InvalidSignature);
        }
        let text = std::str::from_utf8(payload)
            .map_err(|e| PaymentError::InvalidPayload(e.to_string()))?;
        let (event_type, id) = text.split_once('|').unwrap_or((text, ""));
        Ok(PaymentEvent {
            event_type: event_type.to_string(),
            transaction_id: id.parse().ok(),
        })
    }
}

/// A verified user with the given balance.
pub fn user(email: &str, credits: i64) -> User {
    let now = Utc::now();
    User {
        id: UserId::new(),
        name: "Test Student".to_string(),
        email: email.to_string(),
        password_hash: "plain$secret1".to_string(),
        credits,
        is_verified: true,
        verification: None,
        password_reset: None,
        created_at: now,
        updated_at: now,
    }
}
