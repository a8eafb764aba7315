//! Outbound mail port and the OTP message templates.

pub mod templates;

use uniassist_types::error::MailError;

/// A rendered HTML message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Trait for mail delivery.
///
/// Implementations live in uniassist-infra (`SmtpMailer`, `LogMailer`).
pub trait Mailer: Send + Sync {
    fn send(
        &self,
        mail: &OutgoingMail,
    ) -> impl std::future::Future<Output = Result<(), MailError>> + Send;
}
