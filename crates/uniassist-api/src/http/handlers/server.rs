//! Liveness endpoints.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /
pub async fn root() -> &'static str {
    "UniAssist Server is Live"
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = state.db_pool.ping().await;
    Json(json!({
        "success": database,
        "status": if database { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "guestSessions": state.guest_service.store().len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
