//! Speech-to-text port.

use uniassist_types::error::TranscriptionError;
use uniassist_types::llm::Transcript;

use super::audio::AudioClip;

/// Trait for speech-to-text backends.
///
/// Implementations live in uniassist-infra (e.g., `AssemblyAiTranscriber`).
pub trait Transcriber: Send + Sync {
    /// Service name recorded in `voiceMeta.transcriptionService`.
    fn name(&self) -> &str;

    fn is_configured(&self) -> bool;

    /// Transcribe a clip. Returns `TranscriptionError::Empty` when the
    /// service found no speech.
    fn transcribe(
        &self,
        clip: &AudioClip,
    ) -> impl std::future::Future<Output = Result<Transcript, TranscriptionError>> + Send;
}
