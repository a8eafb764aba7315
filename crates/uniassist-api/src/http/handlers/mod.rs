//! HTTP request handlers for the REST API.

pub mod chat;
pub mod credit;
pub mod guest;
pub mod message;
pub mod server;
pub mod user;
