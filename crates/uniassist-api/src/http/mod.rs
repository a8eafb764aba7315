//! HTTP/REST API layer for UniAssist.
//!
//! Axum-based JSON API under `/api/` with bearer-token authentication and
//! the `{ success, message, ... }` body format the SPA expects.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
