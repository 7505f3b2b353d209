//! Signup, login and logout

use crate::auth::{
    clear_cookie, generate_token, hash_password, session_cookie, verify_password, CurrentUser,
};
use crate::error::WebError;
use crate::state::AppState;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse};
use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
}

#[derive(Debug, Deserialize)]
struct SignupRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Create a session row and return the Set-Cookie value for it
fn issue_session(state: &AppState, user_id: i64) -> Result<String, WebError> {
    let token = generate_token();
    let lifetime = state.config.auth.session_lifetime_secs;
    state
        .stores
        .sessions
        .create(&token, user_id, Utc::now() + Duration::seconds(lifetime))?;
    Ok(session_cookie(
        &state.config.auth.cookie_name,
        &token,
        lifetime,
    ))
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, WebError> {
    validate_signup(&req)?;

    // PBKDF2 at production iteration counts takes long enough to stall a
    // runtime worker; hash off the async threads.
    let iterations = state.config.auth.pbkdf2_iterations;
    let password = req.password.clone();
    let password_hash =
        tokio::task::spawn_blocking(move || hash_password(&password, iterations))
            .await
            .map_err(|e| WebError::Internal(e.to_string()))?;
    let user = state
        .stores
        .users
        .create(&req.username, &req.email, &password_hash)?;
    info!(username = %user.username, "Signup successful");

    let cookie = issue_session(&state, user.id)?;
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "success": true, "message": "Account created successfully" })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, WebError> {
    let user = state
        .stores
        .users
        .get_by_username(&req.username)?
        .ok_or(WebError::InvalidCredentials)?;

    let password = req.password.clone();
    let stored = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| WebError::Internal(e.to_string()))?;
    if !valid {
        return Err(WebError::InvalidCredentials);
    }
    info!(username = %user.username, "Login successful");

    let cookie = issue_session(&state, user.id)?;
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "success": true, "message": "Logged in successfully" })),
    ))
}

async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse, WebError> {
    state.stores.sessions.delete(&current.token)?;
    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, clear_cookie(&state.config.auth.cookie_name))]),
        Json(json!({ "success": true, "message": "Logged out" })),
    ))
}

fn validate_signup(req: &SignupRequest) -> Result<(), WebError> {
    let username_len = req.username.chars().count();
    if !(3..=150).contains(&username_len) {
        return Err(WebError::Validation(
            "Username must be between 3 and 150 characters".to_string(),
        ));
    }
    if !is_valid_email(&req.email) {
        return Err(WebError::Validation("Invalid email address".to_string()));
    }
    if req.password.chars().count() < 6 {
        return Err(WebError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

/// Shallow structural email check: one `@`, non-empty local part, domain
/// with a dot and no whitespace
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
        && !domain.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));

        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("alice@.com"));
        assert!(!is_valid_email("alice@example.com."));
        assert!(!is_valid_email("al ice@example.com"));
        assert!(!is_valid_email("alice@ex@ample.com"));
    }

    #[test]
    fn signup_validation_messages() {
        let req = SignupRequest {
            username: "ab".into(),
            email: "a@example.com".into(),
            password: "longenough".into(),
        };
        assert!(matches!(
            validate_signup(&req),
            Err(WebError::Validation(m)) if m.contains("Username")
        ));

        let req = SignupRequest {
            username: "alice".into(),
            email: "nope".into(),
            password: "longenough".into(),
        };
        assert!(matches!(
            validate_signup(&req),
            Err(WebError::Validation(m)) if m.contains("email")
        ));

        let req = SignupRequest {
            username: "alice".into(),
            email: "a@example.com".into(),
            password: "short".into(),
        };
        assert!(matches!(
            validate_signup(&req),
            Err(WebError::Validation(m)) if m.contains("Password")
        ));
    }
}
