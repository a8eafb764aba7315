//! Success response format.
//!
//! Every success body is a flat JSON object:
//! ```json
//! { "success": true, "message": "Chat Created", "chat": { ... } }
//! ```
//! The payload's fields are merged next to `success` and `message`.

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Empty {}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// Must serialize as a JSON object (a struct, map, or `json!({..})`).
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<Empty> {
    /// A success body carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse::success(Empty {}).with_message(message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
