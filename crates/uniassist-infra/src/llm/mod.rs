//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](uniassist_core::llm::provider::LlmProvider)
//! used by the message service.

pub mod groq;
