//! Scan history: list and clear

use crate::auth::CurrentUser;
use crate::error::WebError;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::info;

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/api/history", get(list_history))
        .route("/api/history/clear", post(clear_history))
}

async fn list_history(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<serde_json::Value>, WebError> {
    let items: Vec<serde_json::Value> = state
        .stores
        .history
        .list_for_user(current.user.id)?
        .into_iter()
        .map(|item| {
            json!({
                "id": item.id,
                "productName": item.product_name,
                "healthScore": item.health_score,
                "ecoScore": item.eco_score,
                "image": item.image_filename.map(|f| format!("/uploads/{}", f)),
                "timestamp": item.created_at.to_rfc3339(),
            })
        })
        .collect();

    Ok(Json(json!({ "success": true, "data": items })))
}

async fn clear_history(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<serde_json::Value>, WebError> {
    let deleted = state.stores.history.clear_for_user(current.user.id)?;
    info!(user = %current.user.username, deleted, "History cleared");
    Ok(Json(
        json!({ "success": true, "message": "History cleared successfully" }),
    ))
}
