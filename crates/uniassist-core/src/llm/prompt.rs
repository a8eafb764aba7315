//! System prompts and completion-request builders.
//!
//! Each assistant mode (text Q&A, email drafting, voice reply) has its own
//! system prompt and token ceiling. Sampling settings come from `LlmConfig`.

use uniassist_types::config::LlmConfig;
use uniassist_types::llm::{CompletionRequest, Message};

pub const TEXT_SYSTEM_PROMPT: &str = "You are UniAssist, a helpful university assistant for MAJU University. \
Help students with academic queries, course information, assignment help, \
email drafting, and university procedures. Be concise and accurate.";

pub const EMAIL_SYSTEM_PROMPT: &str = "You are an email drafting assistant for university students. \
Draft professional emails for professors, administration, or other students. \
Include proper salutations, clear subject, professional tone, and closing remarks. \
Format the email properly with paragraphs. \
Provide ONLY the email content without explanations.";

/// Used when the model returns an empty text answer.
pub const EMPTY_TEXT_REPLY: &str = "No response generated.";

/// Used when the model returns an empty email draft.
pub const EMPTY_EMAIL_REPLY: &str = "No email generated.";

/// Used when the voice reply completion fails after a successful transcription.
pub const VOICE_FAILURE_REPLY: &str = "I received your voice message, but I'm having trouble generating a detailed response right now. Please try again or rephrase your question.";

/// Used when the voice reply completion comes back empty.
pub const EMPTY_VOICE_REPLY: &str =
    "I received your voice message! Please let me know how I can help you further.";

/// Subject recorded on a drafted email when the user gave none.
pub const DEFAULT_DRAFT_SUBJECT: &str = "Drafted Email";

fn voice_system_prompt(transcript: &str) -> String {
    format!(
        "You are UniAssist, an AI assistant for MAJU University students. \
The user sent a voice message. Here's what they said:\n\n\"{transcript}\"\n\n\
Respond helpfully and naturally to their voice message. \
If the transcription seems unclear, ask for clarification politely. \
Keep your response concise and relevant to their query."
    )
}

/// The user turn sent for an email draft.
pub fn email_user_prompt(prompt: &str, recipient: Option<&str>, subject: Option<&str>) -> String {
    format!(
        "Draft an email based on: {prompt}\nRecipient: {}\nSubject: {}",
        recipient.filter(|r| !r.is_empty()).unwrap_or("Not specified"),
        subject.filter(|s| !s.is_empty()).unwrap_or("No subject"),
    )
}

/// The question sent to the knowledge base for a guest email draft.
pub fn guest_email_question(prompt: &str, recipient: Option<&str>, subject: Option<&str>) -> String {
    format!(
        "Please help draft an email based on: {prompt}\nRecipient: {}\nSubject: {}\n\
Please format the email professionally with salutation, body, and closing.",
        recipient.filter(|r| !r.is_empty()).unwrap_or("Not specified"),
        subject.filter(|s| !s.is_empty()).unwrap_or("No subject"),
    )
}

fn request(config: &LlmConfig, system: String, user: String, max_tokens: u32) -> CompletionRequest {
    CompletionRequest {
        model: config.model.clone(),
        messages: vec![Message::user(user)],
        system: Some(system),
        max_tokens,
        temperature: Some(config.temperature),
        top_p: Some(config.top_p),
    }
}

pub fn text_request(config: &LlmConfig, prompt: &str) -> CompletionRequest {
    request(
        config,
        TEXT_SYSTEM_PROMPT.to_string(),
        prompt.to_string(),
        config.max_tokens,
    )
}

pub fn email_request(
    config: &LlmConfig,
    prompt: &str,
    recipient: Option<&str>,
    subject: Option<&str>,
) -> CompletionRequest {
    request(
        config,
        EMAIL_SYSTEM_PROMPT.to_string(),
        email_user_prompt(prompt, recipient, subject),
        config.email_max_tokens,
    )
}

pub fn voice_request(config: &LlmConfig, transcript: &str) -> CompletionRequest {
    request(
        config,
        voice_system_prompt(transcript),
        transcript.to_string(),
        config.max_tokens,
    )
}
