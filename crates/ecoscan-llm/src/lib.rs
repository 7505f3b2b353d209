//! Language-model integration for EcoScan.
//!
//! One trait, [`AnalysisProvider`], covers the two model interactions the
//! product needs: structured label analysis and follow-up chat. The Groq
//! implementation talks to the OpenAI-compatible chat-completions API; a
//! mock implementation backs the web-layer tests.
//!
//! Analysis never fails outward. OCR or model failures produce a degraded
//! [`ProductAnalysis`](ecoscan_core::ProductAnalysis) carrying an `error`
//! field, matching how the product surfaces problems to the client.

pub mod error;
pub mod mock;
pub mod parse;
pub mod prompt;
pub mod provider;

pub use error::{LlmError, LlmResult};
pub use mock::MockProvider;
pub use provider::{AnalysisProvider, GroqProvider};
