//! LlmProvider trait definition.
//!
//! This is the core abstraction the completion backend implements.
//! Uses RPITIT for `complete` so services stay generic without boxing.

use uniassist_types::error::LlmError;
use uniassist_types::llm::{CompletionRequest, CompletionResponse};

/// Trait for LLM provider backends (Groq, or any OpenAI-compatible endpoint).
///
/// Implementations live in uniassist-infra (e.g., `GroqProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "groq").
    fn name(&self) -> &str;

    /// Model used when a request leaves `model` empty.
    fn model(&self) -> &str;

    /// Whether credentials are present. An unconfigured provider fails
    /// every call with `LlmError::NotConfigured`.
    fn is_configured(&self) -> bool;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
