//! Stripe Checkout and webhook verification.
//!
//! Checkout sessions are created with a form-encoded POST to
//! `/v1/checkout/sessions`. Webhooks are authenticated with the
//! `Stripe-Signature` header: `t=<unix ts>,v1=<hex>[,v1=<hex>...]`, where each
//! `v1` is HMAC-SHA256 over `"<t>.<raw body>"` keyed with the endpoint secret.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use uuid::Uuid;

use uniassist_core::payment::{PaymentEvent, PaymentGateway};
use uniassist_types::config::PaymentsConfig;
use uniassist_types::credit::{CheckoutRequest, CheckoutSession};
use uniassist_types::error::PaymentError;

type HmacSha256 = Hmac<Sha256>;

/// Does NOT derive Debug: holds the secret key.
pub struct StripeGateway {
    client: reqwest::Client,
    config: PaymentsConfig,
    secret_key: Option<SecretString>,
    webhook_secret: Option<SecretString>,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: String,
}

#[derive(Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: Option<WebhookData>,
}

#[derive(Deserialize)]
struct WebhookData {
    object: WebhookObject,
}

#[derive(Deserialize)]
struct WebhookObject {
    #[serde(default)]
    metadata: Option<WebhookMetadata>,
}

#[derive(Deserialize)]
struct WebhookMetadata {
    #[serde(rename = "transactionId", default)]
    transaction_id: Option<String>,
}

impl StripeGateway {
    pub fn new(
        client: reqwest::Client,
        config: PaymentsConfig,
        secret_key: Option<SecretString>,
        webhook_secret: Option<SecretString>,
    ) -> Self {
        Self {
            client,
            config,
            secret_key,
            webhook_secret,
        }
    }

    fn checkout_form(&self, request: &CheckoutRequest) -> Vec<(&'static str, String)> {
        vec![
            ("mode", "payment".to_string()),
            ("success_url", self.config.success_url.clone()),
            ("cancel_url", self.config.cancel_url.clone()),
            ("customer_email", request.customer_email.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", self.config.currency.clone()),
            (
                "line_items[0][price_data][product_data][name]",
                request.plan_name.clone(),
            ),
            // Stripe amounts are in the smallest currency unit.
            (
                "line_items[0][price_data][unit_amount]",
                (u64::from(request.amount) * 100).to_string(),
            ),
            ("metadata[transactionId]", request.transaction_id.to_string()),
        ]
    }
}

/// Split a `Stripe-Signature` header into its timestamp and `v1` signatures.
fn parse_signature_header(header: &str) -> Result<(i64, Vec<&str>), PaymentError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse::<i64>().map_err(|_| PaymentError::InvalidSignature)?)
            }
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }
    match timestamp {
        Some(t) if !signatures.is_empty() => Ok((t, signatures)),
        _ => Err(PaymentError::InvalidSignature),
    }
}

/// Verify one of the `v1` signatures against the signed payload.
///
/// Uses constant-time comparison (via hmac's `verify_slice`).
fn verify_signature(
    secret: &[u8],
    timestamp: i64,
    payload: &[u8],
    signatures: &[&str],
) -> Result<(), PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| PaymentError::InvalidSignature)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|expected| mac.clone().verify_slice(&expected).is_ok())
            .unwrap_or(false)
    });
    if matched {
        Ok(())
    } else {
        Err(PaymentError::InvalidSignature)
    }
}

fn parse_event(payload: &[u8]) -> Result<PaymentEvent, PaymentError> {
    let event: WebhookEvent =
        serde_json::from_slice(payload).map_err(|e| PaymentError::InvalidPayload(e.to_string()))?;
    let transaction_id = event
        .data
        .and_then(|d| d.object.metadata)
        .and_then(|m| m.transaction_id)
        .and_then(|id| Uuid::parse_str(&id).ok());
    Ok(PaymentEvent {
        event_type: event.event_type,
        transaction_id,
    })
}

impl PaymentGateway for StripeGateway {
    fn is_configured(&self) -> bool {
        self.secret_key.is_some()
    }

    async fn create_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutSession, PaymentError> {
        let key = self.secret_key.as_ref().ok_or(PaymentError::NotConfigured)?;

        let response = self
            .client
            .post(format!(
                "{}/v1/checkout/sessions",
                self.config.api_base.trim_end_matches('/')
            ))
            .bearer_auth(key.expose_secret())
            .form(&self.checkout_form(request))
            .send()
            .await
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("status {status}"));
            return Err(PaymentError::Gateway(message));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;
        let url = session
            .url
            .ok_or_else(|| PaymentError::Gateway("checkout session has no url".to_string()))?;
        Ok(CheckoutSession { id: session.id, url })
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: DateTime<Utc>,
    ) -> Result<PaymentEvent, PaymentError> {
        let secret = self.webhook_secret.as_ref().ok_or(PaymentError::NotConfigured)?;
        let (timestamp, signatures) = parse_signature_header(signature_header)?;

        let tolerance = u64::try_from(self.config.webhook_tolerance_secs).unwrap_or(0);
        let skew = now.timestamp().checked_sub(timestamp).map(i64::unsigned_abs);
        if !skew.is_some_and(|skew| skew <= tolerance) {
            tracing::warn!(timestamp, "webhook timestamp outside tolerance");
            return Err(PaymentError::InvalidSignature);
        }
        verify_signature(
            secret.expose_secret().as_bytes(),
            timestamp,
            payload,
            &signatures,
        )?;
        parse_event(payload)
    }
}
