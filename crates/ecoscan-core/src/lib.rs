//! Core domain types shared across the EcoScan crates.
//!
//! Everything here is plain data: the structured analysis a model returns
//! for a scanned label, the user preference profile that personalizes it,
//! and the status of a background scan task. No I/O lives in this crate.

pub mod analysis;
pub mod error;
pub mod task;
pub mod user;

pub use analysis::{
    chat_context, Ingredient, NutritionalFacts, OtherInfo, ProductAnalysis, Verdict,
    OCR_FAILURE_PLACEHOLDER,
};
pub use error::CoreError;
pub use task::{ScanTask, TaskStatus};
pub use user::{User, UserPreferences};
