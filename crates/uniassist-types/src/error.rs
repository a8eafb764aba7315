use thiserror::Error;

/// Errors from account registration, verification, and login.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("User already exists. Please login")]
    AlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Account already verified. Please login.")]
    AlreadyVerified,

    #[error("{0}")]
    InvalidOtp(&'static str),

    #[error("{0}")]
    OtpExpired(&'static str),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not authorized, token missing or invalid")]
    Unauthorized,

    #[error("Failed to send OTP email")]
    MailDelivery(#[source] MailError),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token error: {0}")]
    Token(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors from chat CRUD.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Validation(String),

    #[error("Chat not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors from the credit-charged message endpoints.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("{0}")]
    Validation(String),

    #[error("Chat not found")]
    ChatNotFound,

    #[error("Insufficient credits")]
    InsufficientCredits,

    #[error("AI service error: {0}")]
    Llm(#[from] LlmError),

    #[error("Transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors from plans, purchases, and payment fulfillment.
#[derive(Debug, Error)]
pub enum CreditError {
    #[error("Invalid plan")]
    UnknownPlan,

    #[error("{0}")]
    Validation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("transaction not found")]
    TransactionNotFound,

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors from guest sessions.
#[derive(Debug, Error)]
pub enum GuestError {
    #[error("{0}")]
    Validation(String),

    #[error("Session not found or expired.")]
    SessionNotFound,

    #[error("Could not transcribe voice message. Please speak more clearly or try text input.")]
    TranscriptionUnavailable,
}

/// Errors from repository operations (used by trait definitions in uniassist-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the completion provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider not configured")]
    NotConfigured,

    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("rate limited")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Errors from the speech-to-text service.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("transcription service not configured")]
    NotConfigured,

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("{0}")]
    Failed(String),

    #[error("transcription timed out after {0} attempts")]
    Timeout(u32),

    #[error("No speech detected in your recording")]
    Empty,
}

/// Errors from the knowledge-base backend.
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("knowledge base unreachable: {0}")]
    Unreachable(String),

    #[error("knowledge base responded with status {0}")]
    Status(u16),

    #[error("invalid knowledge base response: {0}")]
    InvalidResponse(String),
}

/// Errors from outbound mail.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("message build failed: {0}")]
    Build(String),

    #[error("delivery failed: {0}")]
    Transport(String),
}

/// Errors from the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment gateway not configured")]
    NotConfigured,

    #[error("payment gateway error: {0}")]
    Gateway(String),

    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("invalid webhook payload: {0}")]
    InvalidPayload(String),
}
