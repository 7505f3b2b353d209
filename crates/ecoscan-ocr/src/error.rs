//! OCR error types

use thiserror::Error;

/// OCR errors across the engine, service and client
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR binary could not be spawned
    #[error("Failed to run OCR engine: {0}")]
    Spawn(String),

    /// The OCR binary exited nonzero
    #[error("OCR engine failed: {0}")]
    Engine(String),

    /// Temp file or filesystem error while staging the image
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport error talking to the OCR service
    #[error("OCR request failed: {0}")]
    Request(String),

    /// The OCR service answered with a non-success status
    #[error("OCR service error ({status}): {body}")]
    Service { status: u16, body: String },
}

/// Result type for OCR operations
pub type OcrResult<T> = Result<T, OcrError>;
