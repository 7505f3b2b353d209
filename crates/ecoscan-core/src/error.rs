//! Error types for core domain parsing

use thiserror::Error;

/// Errors raised when parsing domain values from their stored form
#[derive(Error, Debug)]
pub enum CoreError {
    /// Unknown task status string in the database
    #[error("Unknown task status: {0}")]
    UnknownStatus(String),

    /// Unknown verdict string from the model
    #[error("Unknown verdict: {0}")]
    UnknownVerdict(String),
}
