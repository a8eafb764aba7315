//! Configuration loading for UniAssist.
//!
//! Reads `config.toml` from the data directory (`~/.uniassist/` by default)
//! and deserializes it into [`AppConfig`]. Falls back to defaults when the
//! file is missing or malformed. Secrets never come from the file; they are
//! read from the environment into [`Secrets`].

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use uniassist_types::config::AppConfig;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "UNIASSIST_DATA_DIR";

/// Resolve the data directory: `UNIASSIST_DATA_DIR`, else `~/.uniassist`.
pub fn resolve_data_dir() -> PathBuf {
    match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".uniassist"),
    }
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_app_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Credentials and endpoint overrides taken from the environment.
///
/// Every field is optional: a missing key leaves the matching adapter
/// unconfigured rather than failing startup.
#[derive(Default)]
pub struct Secrets {
    pub jwt_secret: Option<SecretString>,
    pub groq_api_key: Option<SecretString>,
    pub assemblyai_api_key: Option<SecretString>,
    pub email_user: Option<String>,
    pub email_pass: Option<SecretString>,
    pub stripe_secret_key: Option<SecretString>,
    pub stripe_webhook_secret: Option<SecretString>,
    /// Overrides `guest.knowledge_base_url`.
    pub knowledge_base_url: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secret = |key: &str| get(key).map(SecretString::from);

        Self {
            jwt_secret: secret("JWT_SECRET"),
            groq_api_key: secret("GROQ_API_KEY"),
            assemblyai_api_key: secret("ASSEMBLYAI_API_KEY"),
            email_user: get("EMAIL_USER"),
            email_pass: secret("EMAIL_PASS"),
            stripe_secret_key: secret("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: secret("STRIPE_WEBHOOK_SECRET"),
            knowledge_base_url: get("PYTHON_BACKEND_URL"),
        }
    }

    /// Fold environment overrides into the loaded config.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(url) = &self.knowledge_base_url {
            config.guest.knowledge_base_url = url.trim_end_matches('/').to_string();
        }
    }
}

// Reports which keys are set, never their values.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("jwt_secret", &self.jwt_secret.is_some())
            .field("groq_api_key", &self.groq_api_key.is_some())
            .field("assemblyai_api_key", &self.assemblyai_api_key.is_some())
            .field("email_user", &self.email_user)
            .field("email_pass", &self.email_pass.is_some())
            .field("stripe_secret_key", &self.stripe_secret_key.is_some())
            .field("stripe_webhook_secret", &self.stripe_webhook_secret.is_some())
            .field("knowledge_base_url", &self.knowledge_base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_app_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.credit_plans.plans.len(), 3);
    }

    #[tokio::test]
    async fn load_app_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[server]
port = 4000

[costs]
voice = 4

[guest]
session_ttl_secs = 600
"#,
        )
        .await
        .unwrap();

        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.costs.voice, 4);
        assert_eq!(config.costs.text, 1);
        assert_eq!(config.guest.session_ttl_secs, 600);
    }

    #[tokio::test]
    async fn load_app_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn secrets_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("JWT_SECRET", "s3cret"),
            ("GROQ_API_KEY", "gsk_abc"),
            ("EMAIL_USER", "noreply@maju.edu.pk"),
            ("STRIPE_SECRET_KEY", "  "),
            ("PYTHON_BACKEND_URL", "http://kb:8000/"),
        ]);
        let secrets = Secrets::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(secrets.jwt_secret.as_ref().unwrap().expose_secret(), "s3cret");
        assert!(secrets.groq_api_key.is_some());
        assert!(secrets.assemblyai_api_key.is_none());
        assert!(secrets.stripe_secret_key.is_none(), "blank counts as unset");
        assert_eq!(secrets.email_user.as_deref(), Some("noreply@maju.edu.pk"));

        let mut config = AppConfig::default();
        secrets.apply_overrides(&mut config);
        assert_eq!(config.guest.knowledge_base_url, "http://kb:8000");

        let debug = format!("{secrets:?}");
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("gsk_abc"));
    }
}
