//! AssemblyAI speech-to-text over its REST API.
//!
//! Three steps: upload the raw bytes, create a transcript job for the
//! returned URL, then poll the job until it completes, errors, or the poll
//! budget runs out.
//!
//! The API key is wrapped in [`SecretString`] and only exposed when building
//! the `authorization` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use uniassist_core::voice::audio::AudioClip;
use uniassist_core::voice::transcriber::Transcriber;
use uniassist_types::config::TranscriptionConfig;
use uniassist_types::error::TranscriptionError;
use uniassist_types::llm::Transcript;

pub const SERVICE_NAME: &str = "assemblyai";

#[derive(Clone)]
pub struct AssemblyAiTranscriber {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    config: TranscriptionConfig,
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
    language_code: &'a str,
}

/// The subset of a transcript job we read.
#[derive(Debug, Deserialize)]
struct TranscriptJob {
    id: String,
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    language_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// What a poll of the job tells us.
#[derive(Debug)]
enum JobState {
    Pending,
    Done(Transcript),
    Failed(TranscriptionError),
}

impl TranscriptJob {
    fn state(self) -> JobState {
        match self.status.as_str() {
            "completed" => match self.text {
                Some(text) if !text.trim().is_empty() => JobState::Done(Transcript {
                    text,
                    language_code: self.language_code,
                    service: SERVICE_NAME.to_string(),
                }),
                _ => JobState::Failed(TranscriptionError::Empty),
            },
            "error" => JobState::Failed(TranscriptionError::Failed(
                self.error
                    .unwrap_or_else(|| "transcription failed".to_string()),
            )),
            _ => JobState::Pending,
        }
    }
}

impl AssemblyAiTranscriber {
    pub fn new(
        client: reqwest::Client,
        config: TranscriptionConfig,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            client,
            api_key,
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn upload(&self, key: &SecretString, clip: &AudioClip) -> Result<String, TranscriptionError> {
        let response = self
            .client
            .post(self.url("/v2/upload"))
            .header("authorization", key.expose_secret())
            .header("content-type", "application/octet-stream")
            .body(clip.bytes.clone())
            .send()
            .await
            .map_err(|e| TranscriptionError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TranscriptionError::Upload(format!(
                "status {}",
                response.status()
            )));
        }
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::Upload(e.to_string()))?;
        Ok(body.upload_url)
    }

    async fn fetch_job(
        &self,
        key: &SecretString,
        request: reqwest::RequestBuilder,
    ) -> Result<TranscriptJob, TranscriptionError> {
        let response = request
            .header("authorization", key.expose_secret())
            .send()
            .await
            .map_err(|e| TranscriptionError::Failed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TranscriptionError::Failed(format!(
                "transcription service returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| TranscriptionError::Failed(e.to_string()))
    }
}

impl Transcriber for AssemblyAiTranscriber {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn transcribe(&self, clip: &AudioClip) -> Result<Transcript, TranscriptionError> {
        let key = self.api_key.as_ref().ok_or(TranscriptionError::NotConfigured)?;

        let upload_url = self.upload(key, clip).await?;
        tracing::debug!(bytes = clip.bytes.len(), "audio uploaded");

        let create = self.client.post(self.url("/v2/transcript")).json(&TranscriptRequest {
            audio_url: &upload_url,
            language_code: &self.config.language_code,
        });
        let mut job = self.fetch_job(key, create).await?;
        let job_id = job.id.clone();

        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let mut attempts = 0;
        loop {
            match job.state() {
                JobState::Done(transcript) => {
                    tracing::info!(job_id = %job_id, attempts, "transcription completed");
                    return Ok(transcript);
                }
                JobState::Failed(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "transcription failed");
                    return Err(e);
                }
                JobState::Pending if attempts >= self.config.max_polls => {
                    return Err(TranscriptionError::Timeout(attempts));
                }
                JobState::Pending => {}
            }

            tokio::time::sleep(interval).await;
            attempts += 1;
            let poll = self
                .client
                .get(self.url(&format!("/v2/transcript/{job_id}")));
            job = self.fetch_job(key, poll).await?;
            tracing::debug!(job_id = %job_id, attempts, status = %job.status, "polled transcript");
        }
    }
}
