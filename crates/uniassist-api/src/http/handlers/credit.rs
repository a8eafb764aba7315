//! Credit handlers: `/api/credit/*` and the payment webhook.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::{Value, json};

use uniassist_types::credit::{Fulfillment, PurchaseRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::extractors::json::ApiJson;
use crate::http::response::ApiResponse;
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "stripe-signature";

/// GET /api/credit/plan and /api/credit/plans
pub async fn list_plans(State(state): State<AppState>) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "plans": state.credit_service.plans(),
        "currency": state.config.payments.currency,
    }))
}

/// POST /api/credit/purchase
pub async fn purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<PurchaseRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let session = state.credit_service.purchase(&user, body).await?;
    Ok(ApiResponse::success(json!({ "url": session.url })))
}

/// GET /api/credit/balance
pub async fn balance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<ApiResponse<Value>, AppError> {
    let credits = state.credit_service.balance(&user).await?;
    Ok(ApiResponse::success(json!({ "credits": credits })))
}

/// POST /api/stripe
///
/// Reads the raw body: the signature covers the exact bytes sent.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse<Value>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Validation("Missing Stripe-Signature header".to_string()))?;

    let outcome = state.credit_service.handle_webhook(&body, signature).await?;
    let data = match outcome {
        Fulfillment::Credited {
            transaction_id,
            credits,
        } => json!({ "received": true, "transactionId": transaction_id, "credited": credits }),
        Fulfillment::AlreadyPaid { transaction_id } => {
            json!({ "received": true, "transactionId": transaction_id, "credited": 0 })
        }
        Fulfillment::Ignored { event_type } => {
            json!({ "received": true, "ignored": event_type })
        }
    };
    Ok(ApiResponse::success(data))
}
