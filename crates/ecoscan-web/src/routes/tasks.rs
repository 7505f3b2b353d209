//! Task polling endpoint

use crate::auth::CurrentUser;
use crate::error::WebError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use ecoscan_core::TaskStatus;
use serde_json::json;

pub fn task_routes() -> Router<AppState> {
    Router::new().route("/api/tasks/{id}", get(get_task))
}

async fn get_task(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, WebError> {
    let task = state
        .stores
        .tasks
        .get_for_user(&id, current.user.id)?
        .ok_or_else(|| WebError::NotFound("Task not found".to_string()))?;

    let mut body = json!({
        "task_id": task.id,
        "status": task.status,
    });
    match task.status {
        TaskStatus::Completed => {
            body["result"] = task.result.unwrap_or(serde_json::Value::Null);
        }
        TaskStatus::Failed => {
            body["error"] = json!(task
                .error
                .unwrap_or_else(|| "Unknown error".to_string()));
        }
        _ => {}
    }
    Ok(Json(body))
}
