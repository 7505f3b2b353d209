//! Follow-up chat about a completed scan.
//!
//! The client sends back the `context` string it received from the scan
//! payload; the model answers against it.

use crate::auth::CurrentUser;
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::json;

pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/api/chat", post(chat))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    context: String,
}

async fn chat(
    State(state): State<AppState>,
    _current: CurrentUser,
    Json(req): Json<ChatRequest>,
) -> Json<serde_json::Value> {
    let reply = state.llm.chat(&req.query, &req.context).await;
    Json(json!({ "response": reply }))
}
