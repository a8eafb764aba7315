//! Credit plans, purchase transactions, and per-action pricing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::MessageKind;
use crate::user::UserId;

/// A purchasable bundle of credits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPlan {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Price in whole units of the configured currency.
    pub price: u32,
    pub credits: i64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub popular: bool,
}

/// The plans offered when `config.toml` does not override them (prices in PKR).
pub fn default_plans() -> Vec<CreditPlan> {
    vec![
        CreditPlan {
            id: "basic".to_string(),
            name: "Basic".to_string(),
            price: 499,
            credits: 100,
            features: vec![
                "100 AI Credits".to_string(),
                "Text Q&A (1 credit/query)".to_string(),
                "Email drafting (2 credits/draft)".to_string(),
                "Voice Query (3 credits/query)".to_string(),
                "Basic Support".to_string(),
            ],
            popular: false,
        },
        CreditPlan {
            id: "pro".to_string(),
            name: "Pro".to_string(),
            price: 999,
            credits: 250,
            features: vec![
                "250 AI Credits".to_string(),
                "Everything in Basic".to_string(),
                "University Events Access".to_string(),
            ],
            popular: true,
        },
        CreditPlan {
            id: "premium".to_string(),
            name: "Premium".to_string(),
            price: 1999,
            credits: 600,
            features: vec![
                "600 AI Credits".to_string(),
                "Everything in Pro".to_string(),
                "24/7 Priority Support".to_string(),
            ],
            popular: false,
        },
    ]
}

/// Credits charged per assistant action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageCosts {
    pub text: i64,
    pub email: i64,
    pub voice: i64,
}

impl MessageCosts {
    pub fn for_kind(&self, kind: MessageKind) -> i64 {
        match kind {
            MessageKind::Text => self.text,
            MessageKind::Email => self.email,
            MessageKind::Voice => self.voice,
        }
    }
}

impl Default for MessageCosts {
    fn default() -> Self {
        Self {
            text: 1,
            email: 2,
            voice: 3,
        }
    }
}

/// A credit purchase. Created unpaid; flipped to paid by the payment webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: UserId,
    pub plan_id: String,
    pub amount: u32,
    pub credits: i64,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

/// A hosted checkout page the client is redirected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Everything the payment gateway needs to open a checkout page.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub transaction_id: Uuid,
    pub plan_name: String,
    /// Price in whole currency units.
    pub amount: u32,
    pub customer_email: String,
}

/// Body of `POST /api/credit/purchase`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[serde(default)]
    pub plan_id: Option<String>,
}

/// Result of applying a payment notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fulfillment {
    /// Credits were added for this transaction.
    Credited { transaction_id: Uuid, credits: i64 },
    /// The transaction had already been fulfilled.
    AlreadyPaid { transaction_id: Uuid },
    /// The event type is not one we act on.
    Ignored { event_type: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_costs() {
        let costs = MessageCosts::default();
        assert_eq!(costs.for_kind(MessageKind::Text), 1);
        assert_eq!(costs.for_kind(MessageKind::Email), 2);
        assert_eq!(costs.for_kind(MessageKind::Voice), 3);
    }

    #[test]
    fn test_default_plans() {
        let plans = default_plans();
        let ids: Vec<&str> = plans.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["basic", "pro", "premium"]);
        assert_eq!(plans.iter().filter(|p| p.popular).count(), 1);
        let json = serde_json::to_value(&plans[0]).unwrap();
        assert_eq!(json["_id"], "basic");
    }

    #[test]
    fn test_costs_partial_toml_override() {
        let costs: MessageCosts = toml::from_str("voice = 5").unwrap();
        assert_eq!(costs.voice, 5);
        assert_eq!(costs.text, 1);
    }
}
