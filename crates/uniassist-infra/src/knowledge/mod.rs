//! HTTP client for the retrieval backend that answers guest questions.
//!
//! The backend exposes `POST /ask` with `{"question": ...}` and replies
//! `{"answer": ...}`. Health is probed with the same endpoint and a short
//! timeout.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use uniassist_core::guest::knowledge::KnowledgeBase;
use uniassist_types::config::GuestConfig;
use uniassist_types::error::KnowledgeBaseError;

/// Returned when the backend answers with an empty or missing `answer`.
pub const NO_ANSWER: &str = "No response from knowledge base";

pub struct HttpKnowledgeBase {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    probe_timeout: Duration,
}

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    #[serde(default)]
    answer: Option<String>,
}

impl HttpKnowledgeBase {
    pub fn new(client: reqwest::Client, config: &GuestConfig) -> Self {
        Self {
            client,
            base_url: config.knowledge_base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            probe_timeout: Duration::from_secs(config.health_timeout_secs),
        }
    }

    fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url)
    }

    async fn post_question(
        &self,
        question: &str,
        timeout: Duration,
    ) -> Result<reqwest::Response, KnowledgeBaseError> {
        self.client
            .post(self.ask_url())
            .timeout(timeout)
            .json(&AskRequest { question })
            .send()
            .await
            .map_err(|e| KnowledgeBaseError::Unreachable(e.to_string()))
    }
}

impl KnowledgeBase for HttpKnowledgeBase {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn ask(&self, question: &str) -> Result<String, KnowledgeBaseError> {
        let response = self.post_question(question, self.timeout).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(KnowledgeBaseError::Status(status.as_u16()));
        }

        let body: AskResponse = response
            .json()
            .await
            .map_err(|e| KnowledgeBaseError::InvalidResponse(e.to_string()))?;
        Ok(answer_or_default(body.answer))
    }

    async fn probe(&self) -> bool {
        match self.post_question("test", self.probe_timeout).await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(url = %self.base_url, error = %e, "knowledge base probe failed");
                false
            }
        }
    }
}

fn answer_or_default(answer: Option<String>) -> String {
    answer
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| NO_ANSWER.to_string())
}
