//! The standalone OCR HTTP service: `POST /ocr` with a multipart `file`
//! field, answering `{"raw_text": ...}`.

use crate::engine::OcrEngine;
use crate::error::OcrError;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ecoscan_config::OcrConfig;
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

/// Response body for `/ocr`
#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub raw_text: String,
}

/// Error responses as JSON with an appropriate status
enum ApiError {
    Validation(String),
    Engine(OcrError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Engine(e) => {
                error!("OCR engine failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Build the OCR service router around an engine. The body limit must match
/// what the web backend accepts, or larger uploads would degrade to the
/// placeholder even though the image is fine.
pub fn ocr_router(engine: Arc<dyn OcrEngine>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/ocr", post(extract_text))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(engine)
}

async fn extract_text(
    State(engine): State<Arc<dyn OcrEngine>>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, ApiError> {
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            image = Some(data.to_vec());
        }
    }

    let image = image.ok_or_else(|| ApiError::Validation("No file provided".to_string()))?;
    if image.is_empty() {
        return Err(ApiError::Validation("Empty file".to_string()));
    }

    let raw_text = engine.recognize(&image).await.map_err(ApiError::Engine)?;
    Ok(Json(OcrResponse { raw_text }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "ecoscan-ocr"
    }))
}

/// Bind and serve the OCR service
pub async fn start_service(config: &OcrConfig, engine: Arc<dyn OcrEngine>) -> std::io::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    info!("Starting OCR service on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, ocr_router(engine, config.max_upload_bytes)).await
}
