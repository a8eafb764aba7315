//! Outbound mail adapters.
//!
//! `SmtpMailer` delivers through an authenticated STARTTLS relay (Gmail by
//! default). `LogMailer` stands in when no SMTP credentials are configured:
//! it only logs, so registration still works in development.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, SecretString};

use uniassist_core::mail::{Mailer, OutgoingMail};
use uniassist_types::config::MailConfig;
use uniassist_types::error::MailError;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig, user: &str, password: &SecretString) -> Result<Self, MailError> {
        let from = Mailbox::new(
            Some(config.from_name.clone()),
            user.parse()
                .map_err(|e: lettre::address::AddressError| MailError::Address(e.to_string()))?,
        );
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                user.to_string(),
                password.expose_secret().to_string(),
            ))
            .build();
        Ok(Self { transport, from })
    }
}

/// Build the MIME message for an outgoing mail.
fn build_message(from: &Mailbox, mail: &OutgoingMail) -> Result<Message, MailError> {
    let to: Mailbox = mail
        .to
        .parse()
        .map_err(|e: lettre::address::AddressError| MailError::Address(e.to_string()))?;
    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(&mail.subject)
        .header(ContentType::TEXT_HTML)
        .body(mail.html.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = build_message(&self.from, mail)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        tracing::info!(to = %mail.to, subject = %mail.subject, "mail sent");
        Ok(())
    }
}

/// Logs instead of sending.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        tracing::warn!(
            to = %mail.to,
            subject = %mail.subject,
            "SMTP not configured, mail not delivered"
        );
        tracing::debug!(html = %mail.html, "undelivered mail body");
        Ok(())
    }
}

/// The mailer chosen at startup.
pub enum AppMailer {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl AppMailer {
    /// SMTP when both credentials are present, otherwise the logging fallback.
    pub fn from_credentials(
        config: &MailConfig,
        user: Option<&str>,
        password: Option<&SecretString>,
    ) -> Result<Self, MailError> {
        match (user, password) {
            (Some(user), Some(password)) => Ok(Self::Smtp(SmtpMailer::new(config, user, password)?)),
            _ => Ok(Self::Log(LogMailer)),
        }
    }

    pub fn is_smtp(&self) -> bool {
        matches!(self, Self::Smtp(_))
    }
}

impl Mailer for AppMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        match self {
            Self::Smtp(m) => m.send(mail).await,
            Self::Log(m) => m.send(mail).await,
        }
    }
}
