//! User preference profile, read and written by the frontend in camelCase

use crate::auth::CurrentUser;
use crate::error::WebError;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use ecoscan_core::UserPreferences;
use serde::Deserialize;
use serde_json::json;

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(get_profile))
        .route("/api/profile", post(update_profile))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUpdate {
    #[serde(default)]
    health_conditions: String,
    #[serde(default)]
    allergies: String,
    #[serde(default = "default_diet_type")]
    diet_type: String,
    #[serde(default)]
    ingredients_to_avoid: String,
}

fn default_diet_type() -> String {
    "general".to_string()
}

async fn get_profile(current: CurrentUser) -> Json<serde_json::Value> {
    let prefs = &current.user.preferences;
    Json(json!({
        "username": current.user.username,
        "healthConditions": prefs.health_conditions,
        "allergies": prefs.allergies,
        "dietType": prefs.diet_type,
        "ingredientsToAvoid": prefs.ingredients_to_avoid,
    }))
}

async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<serde_json::Value>, WebError> {
    let prefs = UserPreferences {
        health_conditions: update.health_conditions,
        allergies: update.allergies,
        diet_type: update.diet_type,
        ingredients_to_avoid: update.ingredients_to_avoid,
    };
    state.stores.users.update_preferences(current.user.id, &prefs)?;
    Ok(Json(
        json!({ "success": true, "message": "Profile updated" }),
    ))
}
