//! Shared domain types for UniAssist.
//!
//! This crate contains the domain types used across the UniAssist server:
//! users, chats and messages, credit plans and transactions, guest sessions,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod credit;
pub mod error;
pub mod guest;
pub mod llm;
pub mod user;
