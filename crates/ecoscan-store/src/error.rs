//! Error types for SQLite storage

use thiserror::Error;

/// Storage error type
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema/migration error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Username already taken
    #[error("Username already exists")]
    DuplicateUsername,

    /// Email already registered
    #[error("Email already exists")]
    DuplicateEmail,

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored JSON or timestamp failed to parse
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Underlying rusqlite error
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
