//! Web error type and its HTTP mapping.
//!
//! Everything a handler can fail with funnels through [`WebError`]; the
//! `IntoResponse` impl decides the status code and renders the
//! `{"success": false, "message": ...}` envelope the frontend expects.
//! Unexpected errors are logged and surfaced as a generic 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ecoscan_store::StoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Web backend error type
#[derive(Error, Debug)]
pub enum WebError {
    /// Missing or invalid session
    #[error("Authentication required")]
    Unauthorized,

    /// Wrong username or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Request failed validation
    #[error("{0}")]
    Validation(String),

    /// Resource does not exist (or belongs to another user)
    #[error("{0}")]
    NotFound(String),

    /// Malformed multipart body
    #[error("Invalid upload: {0}")]
    Multipart(String),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Runtime failure (a blocking task panicked or was cancelled)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for web handlers
pub type Result<T> = std::result::Result<T, WebError>;

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            WebError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            WebError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            WebError::Multipart(message) => (StatusCode::BAD_REQUEST, message),
            WebError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            WebError::Store(StoreError::DuplicateUsername) => (
                StatusCode::BAD_REQUEST,
                "Username already exists".to_string(),
            ),
            WebError::Store(StoreError::DuplicateEmail) => (
                StatusCode::BAD_REQUEST,
                "Email already exists".to_string(),
            ),
            WebError::Store(StoreError::NotFound(what)) => {
                (StatusCode::NOT_FOUND, format!("Not found: {}", what))
            }
            WebError::Store(e) => {
                error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            WebError::Io(e) => {
                error!("I/O error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            WebError::Internal(e) => {
                error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_errors_map_to_400_with_message() {
        let response = WebError::Store(StoreError::DuplicateUsername).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = WebError::Store(StoreError::DuplicateEmail).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let response = WebError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unexpected_store_error_is_a_generic_500() {
        let response = WebError::Store(StoreError::Connection("db gone".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
