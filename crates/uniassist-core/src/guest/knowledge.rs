//! Knowledge-base port (the retrieval backend that answers guest questions).

use uniassist_types::error::KnowledgeBaseError;

/// Trait for the question-answering backend.
///
/// Implementations live in uniassist-infra (e.g., `HttpKnowledgeBase`).
pub trait KnowledgeBase: Send + Sync {
    /// Base URL reported by the health endpoint.
    fn endpoint(&self) -> &str;

    /// Ask a question and return the answer text.
    fn ask(
        &self,
        question: &str,
    ) -> impl std::future::Future<Output = Result<String, KnowledgeBaseError>> + Send;

    /// Cheap liveness probe. Never errors; unreachable means `false`.
    fn probe(&self) -> impl std::future::Future<Output = bool> + Send;
}
