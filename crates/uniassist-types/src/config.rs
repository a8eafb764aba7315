//! Application configuration types for UniAssist.
//!
//! `AppConfig` represents the `config.toml` in the data directory. Every
//! field has a default, so an empty or partial file is valid. Secrets are
//! never read from this file; they come from the environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::credit::{CreditPlan, MessageCosts, default_plans};

/// Top-level configuration for the UniAssist server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub costs: MessageCosts,
    pub auth: AuthConfig,
    pub guest: GuestConfig,
    pub transcription: TranscriptionConfig,
    pub mail: MailConfig,
    pub payments: PaymentsConfig,
    pub rate_limit: RateLimitConfig,
    pub credit_plans: CreditPlans,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Pre-built SPA directory served as the router fallback, if present.
    pub web_dir: Option<PathBuf>,
    pub body_limit_bytes: usize,
    /// Key rate limits on the first `X-Forwarded-For` hop instead of the
    /// socket peer. Only safe behind a proxy that overwrites the header.
    pub trust_proxy: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            web_dir: None,
            body_limit_bytes: 10 * 1024 * 1024,
            trust_proxy: false,
        }
    }
}

/// Completion settings for the Groq-hosted model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub email_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 1024,
            email_max_tokens: 2048,
        }
    }
}

/// Account, token, and OTP policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub otp_ttl_secs: i64,
    pub token_ttl_days: i64,
    pub min_password_len: usize,
    pub starting_credits: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_ttl_secs: 5 * 60,
            token_ttl_days: 30,
            min_password_len: 6,
            starting_credits: 100,
        }
    }
}

/// Guest sessions and the knowledge base that answers them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuestConfig {
    pub session_ttl_secs: i64,
    /// Overridden by `PYTHON_BACKEND_URL` when set.
    pub knowledge_base_url: String,
    pub request_timeout_secs: u64,
    pub health_timeout_secs: u64,
}

impl Default for GuestConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 60 * 60,
            knowledge_base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
            health_timeout_secs: 5,
        }
    }
}

/// AssemblyAI speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub base_url: String,
    pub language_code: String,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.assemblyai.com".to_string(),
            language_code: "en".to_string(),
            poll_interval_ms: 1000,
            max_polls: 60,
        }
    }
}

/// Outbound mail. Credentials come from `EMAIL_USER` / `EMAIL_PASS`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            from_name: "UniAssist".to_string(),
        }
    }
}

/// Stripe checkout settings. Keys come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    pub api_base: String,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub webhook_tolerance_secs: i64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.stripe.com".to_string(),
            currency: "pkr".to_string(),
            success_url: "http://localhost:5173/loading".to_string(),
            cancel_url: "http://localhost:5173".to_string(),
            webhook_tolerance_secs: 300,
        }
    }
}

/// Failure budget for the OTP mail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub window_secs: i64,
    pub max_failures: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_failures: 5,
        }
    }
}

/// The purchasable plans. Any `[[credit_plans.plans]]` entry replaces the defaults wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditPlans {
    pub plans: Vec<CreditPlan>,
}

impl Default for CreditPlans {
    fn default() -> Self {
        Self {
            plans: default_plans(),
        }
    }
}

impl CreditPlans {
    pub fn find(&self, id: &str) -> Option<&CreditPlan> {
        self.plans.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.auth.otp_ttl_secs, 300);
        assert_eq!(config.guest.session_ttl_secs, 3600);
        assert_eq!(config.rate_limit.max_failures, 5);
        assert_eq!(config.credit_plans.plans.len(), 3);
    }

    #[test]
    fn test_app_config_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.body_limit_bytes, 10 * 1024 * 1024);
        assert_eq!(config.costs, MessageCosts::default());
        assert!(!config.server.trust_proxy);
    }

    #[test]
    fn test_app_config_deserialize_partial() {
        let toml_str = r#"
[server]
port = 8080

[llm]
model = "llama-3.3-70b-versatile"

[[credit_plans.plans]]
_id = "starter"
name = "Starter"
price = 199
credits = 30
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.credit_plans.plans.len(), 1);
        assert!(config.credit_plans.find("starter").is_some());
        assert!(config.credit_plans.find("basic").is_none());
    }
}
