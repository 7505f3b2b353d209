//! OCR for EcoScan: a Tesseract-backed engine, the single-endpoint HTTP
//! service wrapping it, and the client the web backend uses to call it.
//!
//! The client degrades to a placeholder string instead of propagating
//! failures; a scan should still go through (and tell the user OCR failed)
//! when the sidecar is down.

pub mod client;
pub mod engine;
pub mod error;
pub mod service;

pub use client::OcrClient;
pub use engine::{OcrEngine, TesseractEngine};
pub use error::{OcrError, OcrResult};
pub use service::{ocr_router, start_service};
