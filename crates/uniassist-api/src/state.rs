//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository and adapter traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::SecretString;

use uniassist_core::guest::service::GuestService;
use uniassist_core::guest::store::GuestSessionStore;
use uniassist_core::service::auth::AuthService;
use uniassist_core::service::chat::ChatService;
use uniassist_core::service::credit::CreditService;
use uniassist_core::service::message::MessageService;
use uniassist_core::service::rate_limit::RateLimiter;
use uniassist_infra::config::Secrets;
use uniassist_infra::crypto::hash::Sha256ContentHasher;
use uniassist_infra::crypto::password::Argon2PasswordHasher;
use uniassist_infra::crypto::token::JwtTokenIssuer;
use uniassist_infra::knowledge::HttpKnowledgeBase;
use uniassist_infra::llm::groq::GroqProvider;
use uniassist_infra::mail::AppMailer;
use uniassist_infra::payment::StripeGateway;
use uniassist_infra::sqlite::chat::SqliteChatRepository;
use uniassist_infra::sqlite::pool::{DatabasePool, database_url};
use uniassist_infra::sqlite::transaction::SqliteTransactionRepository;
use uniassist_infra::sqlite::user::SqliteUserRepository;
use uniassist_infra::transcription::assemblyai::AssemblyAiTranscriber;
use uniassist_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteAuthService = AuthService<
    SqliteUserRepository,
    AppMailer,
    Argon2PasswordHasher,
    JwtTokenIssuer,
    Sha256ContentHasher,
>;

pub type ConcreteChatService = ChatService<SqliteChatRepository>;

pub type ConcreteMessageService = MessageService<
    SqliteChatRepository,
    SqliteUserRepository,
    GroqProvider,
    AssemblyAiTranscriber,
>;

pub type ConcreteCreditService =
    CreditService<SqliteUserRepository, SqliteTransactionRepository, StripeGateway>;

pub type ConcreteGuestService = GuestService<HttpKnowledgeBase, AssemblyAiTranscriber>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<ConcreteAuthService>,
    pub chat_service: Arc<ConcreteChatService>,
    pub message_service: Arc<ConcreteMessageService>,
    pub credit_service: Arc<ConcreteCreditService>,
    pub guest_service: Arc<ConcreteGuestService>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Direct repository access for the admin CLI commands.
    pub users: SqliteUserRepository,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
    /// Whether OTP mail goes out over SMTP (false: logged only).
    pub smtp_enabled: bool,
}

/// A throwaway signing key for when `JWT_SECRET` is unset. Tokens signed
/// with it stop verifying when the process restarts.
fn ephemeral_jwt_secret() -> SecretString {
    let key: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    SecretString::from(key)
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init(
        data_dir: PathBuf,
        config: AppConfig,
        secrets: Secrets,
    ) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("uniassist/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let users = SqliteUserRepository::new(db_pool.clone());
        let chats = SqliteChatRepository::new(db_pool.clone());
        let transactions = SqliteTransactionRepository::new(db_pool.clone());

        let jwt_secret = match secrets.jwt_secret {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET is not set; using a per-process key");
                ephemeral_jwt_secret()
            }
        };
        let mailer = AppMailer::from_credentials(
            &config.mail,
            secrets.email_user.as_deref(),
            secrets.email_pass.as_ref(),
        )?;
        let smtp_enabled = mailer.is_smtp();
        if !smtp_enabled {
            tracing::warn!("EMAIL_USER/EMAIL_PASS not set; OTP mail will only be logged");
        }

        let auth_service = AuthService::new(
            users.clone(),
            mailer,
            Argon2PasswordHasher,
            JwtTokenIssuer::new(jwt_secret, Duration::days(config.auth.token_ttl_days)),
            Sha256ContentHasher,
            config.auth.clone(),
        );

        let transcriber = AssemblyAiTranscriber::new(
            http.clone(),
            config.transcription.clone(),
            secrets.assemblyai_api_key.clone(),
        );
        let llm = GroqProvider::new(&config.llm, secrets.groq_api_key.clone());
        let message_service = MessageService::new(
            chats.clone(),
            users.clone(),
            llm,
            transcriber.clone(),
            config.llm.clone(),
            config.costs.clone(),
        );

        let gateway = StripeGateway::new(
            http.clone(),
            config.payments.clone(),
            secrets.stripe_secret_key.clone(),
            secrets.stripe_webhook_secret.clone(),
        );
        let credit_service = CreditService::new(
            users.clone(),
            transactions,
            gateway,
            config.credit_plans.clone(),
        );

        let guest_service = GuestService::new(
            HttpKnowledgeBase::new(http, &config.guest),
            transcriber,
            GuestSessionStore::new(Duration::seconds(config.guest.session_ttl_secs)),
        );

        let rate_limiter = RateLimiter::new(
            Duration::seconds(config.rate_limit.window_secs),
            config.rate_limit.max_failures,
        );

        Ok(Self {
            auth_service: Arc::new(auth_service),
            chat_service: Arc::new(ChatService::new(chats)),
            message_service: Arc::new(message_service),
            credit_service: Arc::new(credit_service),
            guest_service: Arc::new(guest_service),
            rate_limiter: Arc::new(rate_limiter),
            users,
            config: Arc::new(config),
            data_dir,
            db_pool,
            smtp_enabled,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

    /// State over a fresh database with every external adapter unconfigured.
    pub async fn test_state() -> (AppState, TempDir) {
        let tmp = TempDir::new().unwrap();
        let secrets = Secrets {
            jwt_secret: Some(SecretString::from(TEST_JWT_SECRET.to_string())),
            // Nothing listens on the discard port, so knowledge-base calls fail fast.
            knowledge_base_url: Some("http://127.0.0.1:9".to_string()),
            ..Secrets::default()
        };
        let mut config = AppConfig::default();
        secrets.apply_overrides(&mut config);
        let state = AppState::init(tmp.path().to_path_buf(), config, secrets)
            .await
            .unwrap();
        (state, tmp)
    }

    #[tokio::test]
    async fn test_init_with_no_credentials() {
        let (state, _tmp) = test_state().await;
        assert!(!state.smtp_enabled);
        assert!(state.db_pool.ping().await);
        let health = state.message_service.health();
        assert!(!health.llm);
        assert!(!health.transcription);
        assert_eq!(state.credit_service.plans().len(), 3);
    }

    #[test]
    fn test_ephemeral_secret_is_random() {
        use secrecy::ExposeSecret;
        let a = ephemeral_jwt_secret();
        let b = ephemeral_jwt_secret();
        assert_eq!(a.expose_secret().len(), 64);
        assert_ne!(a.expose_secret(), b.expose_secret());
    }
}
