//! EcoScan web backend.
//!
//! JSON-over-HTTP API for the scanning frontend: account signup/login with
//! cookie sessions, multipart image upload, a small background worker pool
//! running the OCR + analysis pipeline, task polling, scan history and
//! follow-up chat.

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

pub use error::{Result, WebError};
pub use server::{app, start_server};
pub use state::AppState;
