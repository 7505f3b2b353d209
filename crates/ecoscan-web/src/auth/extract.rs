//! Extractor guarding authenticated routes.
//!
//! Handlers take a [`CurrentUser`] argument; requests without a valid,
//! unexpired session cookie are rejected with 401 before the handler runs.

use crate::auth::session::token_from_headers;
use crate::error::WebError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use ecoscan_core::User;
use tracing::warn;

/// The authenticated user behind the request, plus their session token
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers, &state.config.auth.cookie_name)
            .ok_or(WebError::Unauthorized)?;

        let user_id = state
            .stores
            .sessions
            .resolve(&token, Utc::now())?
            .ok_or(WebError::Unauthorized)?;

        let user = state
            .stores
            .users
            .get_by_id(user_id)?
            .ok_or_else(|| {
                // session row outlived its user; treat as logged out
                warn!(user_id, "Session resolved to a missing user");
                WebError::Unauthorized
            })?;

        Ok(CurrentUser { user, token })
    }
}
