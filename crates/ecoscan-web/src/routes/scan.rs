//! Scan upload: accept the image, persist it, enqueue the background task

use crate::auth::CurrentUser;
use crate::error::WebError;
use crate::services::scan::ScanJob;
use crate::state::AppState;
use axum::http::StatusCode;
use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

pub fn scan_routes() -> Router<AppState> {
    Router::new().route("/api/scan", post(scan))
}

async fn scan(
    State(state): State<AppState>,
    current: CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<serde_json::Value>), WebError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::Multipart(e.to_string()))?
    {
        if field.name() == Some("product_image") {
            let original_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| WebError::Multipart(e.to_string()))?;
            upload = Some((original_name, data.to_vec()));
        }
    }

    let Some((original_name, data)) = upload else {
        return Err(WebError::Validation("No image provided".to_string()));
    };
    if original_name.is_empty() {
        return Err(WebError::Validation("No image selected".to_string()));
    }

    let filename = format!(
        "{}_{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        sanitize_filename(&original_name)
    );
    tokio::fs::create_dir_all(&state.config.web.upload_dir).await?;
    tokio::fs::write(state.config.web.upload_dir.join(&filename), &data).await?;

    let task_id = Uuid::new_v4().to_string();
    state.stores.tasks.create(&task_id, current.user.id)?;

    state
        .scan_queue
        .send_async(ScanJob {
            task_id: task_id.clone(),
            user_id: current.user.id,
            image_filename: filename,
        })
        .await
        .map_err(|_| {
            // workers are gone; the task would sit pending forever
            let _ = state.stores.tasks.fail(&task_id, "Scan queue unavailable");
            WebError::Store(ecoscan_store::StoreError::Connection(
                "Scan queue unavailable".to_string(),
            ))
        })?;

    info!(task_id = %task_id, user = %current.user.username, "Scan queued");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "success": true, "task_id": task_id })),
    ))
}

/// Flatten the client-supplied filename to a safe basename: path separators
/// are dropped, anything outside `[A-Za-z0-9._-]` becomes `_`
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.').to_string();
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed
    }
}
