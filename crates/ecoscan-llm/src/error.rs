//! LLM provider error types

use thiserror::Error;

/// Errors from the chat-completions transport
#[derive(Error, Debug)]
pub enum LlmError {
    /// HTTP-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status from the API
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The model returned no content
    #[error("Empty response")]
    EmptyResponse,
}

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;
