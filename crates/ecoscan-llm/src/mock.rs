//! Mock analysis provider for testing
//!
//! Lets LLM-dependent code (the scan pipeline, the chat endpoint) be tested
//! without API keys or network calls. Responses are fixed, and calls are
//! recorded for verification.

use crate::provider::AnalysisProvider;
use async_trait::async_trait;
use ecoscan_core::{ProductAnalysis, UserPreferences};
use parking_lot::Mutex;
use std::sync::Arc;

/// Record of one call made to the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    /// `analyze` was called with this OCR text
    Analyze { ocr_text: String },
    /// `chat` was called with this query and context
    Chat { query: String, context: String },
}

/// Deterministic [`AnalysisProvider`] for tests
#[derive(Clone)]
pub struct MockProvider {
    analysis: ProductAnalysis,
    chat_reply: String,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockProvider {
    /// Mock returning the given analysis for every `analyze` call
    pub fn new(analysis: ProductAnalysis) -> Self {
        Self {
            analysis,
            chat_reply: "This is a mock reply.".to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the fixed chat reply
    pub fn with_chat_reply(mut self, reply: impl Into<String>) -> Self {
        self.chat_reply = reply.into();
        self
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl AnalysisProvider for MockProvider {
    async fn analyze(&self, ocr_text: &str, _prefs: &UserPreferences) -> ProductAnalysis {
        self.calls.lock().push(MockCall::Analyze {
            ocr_text: ocr_text.to_string(),
        });
        let mut analysis = self.analysis.clone();
        analysis.raw_text = ocr_text.to_lowercase();
        analysis
    }

    async fn chat(&self, query: &str, context: &str) -> String {
        self.calls.lock().push(MockCall::Chat {
            query: query.to_string(),
            context: context.to_string(),
        });
        self.chat_reply.clone()
    }
}
