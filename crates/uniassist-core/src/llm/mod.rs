//! LLM provider abstractions for UniAssist.
//!
//! - `LlmProvider`: RPITIT trait for the hosted completion backend
//! - `prompt`: system prompts and request builders for each assistant mode

pub mod prompt;
pub mod provider;
