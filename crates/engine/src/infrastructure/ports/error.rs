//! Error types for port operations.

/// Text-generation failure.
///
/// Callers in the core treat every variant the same way (fallback path); the
/// variants exist for logs and for the connection check.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("LLM backend misconfigured: {0}")]
    Configuration(String),
}

impl LlmError {
    /// Create a RequestFailed error from any displayable cause.
    pub fn request(message: impl ToString) -> Self {
        Self::RequestFailed(message.to_string())
    }

    /// Create an InvalidResponse error from any displayable cause.
    pub fn invalid_response(message: impl ToString) -> Self {
        Self::InvalidResponse(message.to_string())
    }
}

/// Game-state read failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GameStateError {
    /// No encounter is running, or the provider could not be reached.
    #[error("Game state unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with data that could not be decoded.
    #[error("Malformed game state: {0}")]
    Malformed(String),
}
