use thiserror::Error;

/// Top-level error type for the assay library
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssayError {
    /// Error from an agent
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// Error from the LLM client
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors that can occur during agent execution
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AgentError {
    /// LLM client error during agent execution
    #[error("LLM client error: {0}")]
    Llm(#[from] LlmError),

    /// Failed to parse LLM response
    #[error("Failed to parse response: {0}")]
    ParseFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing credentials or other resources needed to build the agent
    #[error("Agent setup failed: {0}")]
    Setup(String),

    /// Agent completed without producing an answer
    #[error("Agent completed but produced no answer")]
    NoAnswer,

    /// Other agent-specific error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if this error came from a timed-out model call.
    ///
    /// # Example
    ///
    /// ```
    /// use assay_core::{AgentError, LlmError};
    ///
    /// let err = AgentError::Llm(LlmError::Timeout(30_000));
    /// assert!(err.is_timeout());
    /// assert!(!AgentError::NoAnswer.is_timeout());
    /// ```
    pub fn is_timeout(&self) -> bool {
        matches!(self, AgentError::Llm(LlmError::Timeout(_)))
    }
}

/// Errors that can occur in the LLM client
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LlmError {
    /// API key missing or empty
    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    /// Request timed out
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Connection or transport failure before a response arrived
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Response processing error
    #[error("Failed to process response: {0}")]
    ResponseProcessing(String),

    /// No content in response
    #[error("No content in response")]
    NoContent,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Other LLM error
    #[error("{0}")]
    Other(String),
}

impl LlmError {
    /// Check if this error is retryable.
    ///
    /// Returns `true` for transient errors that might succeed on retry:
    /// timeouts, rate limits, transport failures and 5xx responses.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Timeout(_) | LlmError::RateLimit(_) | LlmError::Transport(_) => true,
            LlmError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return LlmError::Timeout(0);
        }
        if error.is_connect() || error.is_request() {
            return LlmError::Transport(error.to_string());
        }
        if error.is_decode() {
            return LlmError::ResponseProcessing(error.to_string());
        }
        LlmError::Other(error.to_string())
    }
}
