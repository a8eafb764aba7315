//! Credit plans, checkout, and payment fulfillment.

use chrono::{DateTime, Utc};
use uniassist_types::config::CreditPlans;
use uniassist_types::credit::{
    CheckoutRequest, CheckoutSession, CreditPlan, Fulfillment, PurchaseRequest, Transaction,
};
use uniassist_types::error::{CreditError, PaymentError, RepositoryError};
use uniassist_types::user::User;
use uuid::Uuid;

use crate::payment::{CHECKOUT_COMPLETED, PaymentGateway};
use crate::repository::transaction::TransactionRepository;
use crate::repository::user::UserRepository;
use crate::service::validation::required;

pub struct CreditService<U, X, G>
where
    U: UserRepository,
    X: TransactionRepository,
    G: PaymentGateway,
{
    users: U,
    transactions: X,
    gateway: G,
    plans: CreditPlans,
}

impl<U, X, G> CreditService<U, X, G>
where
    U: UserRepository,
    X: TransactionRepository,
    G: PaymentGateway,
{
    pub fn new(users: U, transactions: X, gateway: G, plans: CreditPlans) -> Self {
        Self {
            users,
            transactions,
            gateway,
            plans,
        }
    }

    pub fn plans(&self) -> &[CreditPlan] {
        &self.plans.plans
    }

    /// Record an unpaid transaction and open a checkout page for it.
    pub async fn purchase(
        &self,
        owner: &User,
        request: PurchaseRequest,
    ) -> Result<CheckoutSession, CreditError> {
        let plan = required(request.plan_id.as_deref())
            .and_then(|id| self.plans.find(id))
            .ok_or(CreditError::UnknownPlan)?;
        if !self.gateway.is_configured() {
            return Err(PaymentError::NotConfigured.into());
        }

        let transaction = self
            .transactions
            .create(&Transaction {
                id: Uuid::now_v7(),
                user_id: owner.id,
                plan_id: plan.id.clone(),
                amount: plan.price,
                credits: plan.credits,
                is_paid: false,
                created_at: Utc::now(),
            })
            .await?;

        let session = self
            .gateway
            .create_checkout(&CheckoutRequest {
                transaction_id: transaction.id,
                plan_name: plan.name.clone(),
                amount: plan.price,
                customer_email: owner.email.clone(),
            })
            .await?;

        tracing::info!(
            user_id = %owner.id,
            transaction_id = %transaction.id,
            plan = %plan.id,
            "checkout session created"
        );
        Ok(session)
    }

    /// Current balance, re-read from storage.
    pub async fn balance(&self, owner: &User) -> Result<i64, CreditError> {
        self.users
            .get_by_id(&owner.id)
            .await?
            .map(|u| u.credits)
            .ok_or(CreditError::UserNotFound)
    }

    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<Fulfillment, CreditError> {
        self.handle_webhook_at(payload, signature_header, Utc::now())
            .await
    }

    /// Apply a signed payment notification. Only completed checkouts credit
    /// anything; a repeat delivery of the same event is a no-op.
    pub async fn handle_webhook_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: DateTime<Utc>,
    ) -> Result<Fulfillment, CreditError> {
        let event = self.gateway.verify_webhook(payload, signature_header, now)?;
        if event.event_type != CHECKOUT_COMPLETED {
            tracing::debug!(event_type = %event.event_type, "ignoring payment event");
            return Ok(Fulfillment::Ignored {
                event_type: event.event_type,
            });
        }

        let transaction_id = event.transaction_id.ok_or_else(|| {
            CreditError::Validation("checkout session has no transactionId".to_string())
        })?;

        match self.transactions.fulfill(&transaction_id).await {
            Ok(Some(tx)) => {
                tracing::info!(
                    transaction_id = %tx.id,
                    user_id = %tx.user_id,
                    credits = tx.credits,
                    "purchase fulfilled"
                );
                Ok(Fulfillment::Credited {
                    transaction_id: tx.id,
                    credits: tx.credits,
                })
            }
            Ok(None) => {
                tracing::info!(transaction_id = %transaction_id, "purchase already fulfilled");
                Ok(Fulfillment::AlreadyPaid { transaction_id })
            }
            Err(RepositoryError::NotFound) => Err(CreditError::TransactionNotFound),
            Err(e) => Err(e.into()),
        }
    }
}
