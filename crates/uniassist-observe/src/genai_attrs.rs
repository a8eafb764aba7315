//! OpenTelemetry GenAI Semantic Convention attribute names.
//!
//! `tracing` macros need field names as literals, so the completion span in
//! `uniassist-core` spells these out inline. Adapters use the constants with
//! `Span::record` to fill fields the span declared empty.

// --- Required attributes ---

/// The operation being performed (one of the `OP_*` values below).
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The GenAI provider (e.g., "groq").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

// --- Recommended attributes ---

pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

/// The completion id returned by the provider.
pub const GEN_AI_RESPONSE_ID: &str = "gen_ai.response.id";

// --- Operation name values ---

/// Free-form question answered in a chat.
pub const OP_TEXT: &str = "text";

/// Email draft.
pub const OP_EMAIL: &str = "email";

/// Reply to a transcribed voice message.
pub const OP_VOICE: &str = "voice";

// --- Provider name values ---

pub const PROVIDER_GROQ: &str = "groq";
