//! Payment gateway port.

use chrono::{DateTime, Utc};
use uniassist_types::credit::{CheckoutRequest, CheckoutSession};
use uniassist_types::error::PaymentError;
use uuid::Uuid;

/// Event type that fulfills a purchase.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// A verified webhook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    pub event_type: String,
    /// `metadata.transactionId` of the checkout session, when present.
    pub transaction_id: Option<Uuid>,
}

/// Trait for hosted-checkout payment providers.
///
/// Implementations live in uniassist-infra (e.g., `StripeGateway`).
pub trait PaymentGateway: Send + Sync {
    fn is_configured(&self) -> bool;

    /// Open a hosted checkout page for a pending transaction.
    fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> impl std::future::Future<Output = Result<CheckoutSession, PaymentError>> + Send;

    /// Verify a webhook's signature header against the raw body and parse it.
    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: DateTime<Utc>,
    ) -> Result<PaymentEvent, PaymentError>;
}
