//! Unauthenticated guest chat.
//!
//! Guests talk to the university knowledge base instead of the LLM and are
//! never charged. Their conversations live in an in-memory store and expire
//! after a period of inactivity.

pub mod knowledge;
pub mod service;
pub mod store;
