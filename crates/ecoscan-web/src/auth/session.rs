//! Session token generation and cookie plumbing.
//!
//! Tokens are opaque 128-bit-plus random values; all session state lives
//! server-side in the sessions table, so the cookie itself carries nothing
//! to sign or verify.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use rand::RngCore;

const TOKEN_LEN: usize = 32;

/// Generate a fresh session token (hex, 64 chars)
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Build the Set-Cookie value issuing a session
pub fn session_cookie(name: &str, token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

/// Build the Set-Cookie value clearing the session cookie
pub fn clear_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

/// Pull the session token out of the Cookie header, if present
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        let pair = pair.trim();
        if let Some((name, value)) = pair.split_once('=') {
            if name == cookie_name && !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}
