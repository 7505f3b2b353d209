//! Analysis/chat providers.
//!
//! [`GroqProvider`] talks to Groq's OpenAI-compatible chat-completions
//! endpoint. The request/response shapes mirror the OpenAI wire format, so
//! pointing `base_url` at any compatible server (or a test double) works.

use crate::error::{LlmError, LlmResult};
use crate::parse::parse_analysis;
use crate::prompt::{analysis_prompt, chat_system_prompt, ANALYSIS_SYSTEM_PROMPT};
use async_trait::async_trait;
use ecoscan_config::LlmConfig;
use ecoscan_core::{ProductAnalysis, UserPreferences, OCR_FAILURE_PLACEHOLDER};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Canned reply when the user sends an empty chat query
pub const EMPTY_QUERY_REPLY: &str =
    "Ask me something about the product, eco-score or ingredients!";

/// Canned reply when the model returns nothing
pub const EMPTY_MODEL_REPLY: &str =
    "I couldn't generate a response. Try rephrasing your question.";

/// Canned reply when the chat call fails outright
pub const CHAT_FAILURE_REPLY: &str =
    "Something broke, but I'm pretending everything is fine.";

/// The two model interactions the product needs
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Structured risk analysis of OCR'd label text. Infallible by design:
    /// failures come back as a degraded analysis with `error` set.
    async fn analyze(&self, ocr_text: &str, prefs: &UserPreferences) -> ProductAnalysis;

    /// Follow-up chat about a completed scan. Also infallible; failures
    /// come back as canned replies.
    async fn chat(&self, query: &str, context: &str) -> String;
}

/// Groq chat-completions provider
pub struct GroqProvider {
    client: reqwest::Client,
    config: LlmConfig,
}

impl GroqProvider {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// One non-streaming chat-completions round trip
    async fn chat_completion(
        &self,
        messages: Vec<serde_json::Value>,
        temperature: f64,
        max_tokens: u32,
    ) -> LlmResult<String> {
        let request = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
            "top_p": 1,
            "stream": false,
        });

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let reply: ChatCompletionReply = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = reply
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(content)
    }
}

#[async_trait]
impl AnalysisProvider for GroqProvider {
    async fn analyze(&self, ocr_text: &str, prefs: &UserPreferences) -> ProductAnalysis {
        // OCR already failed; asking the model about the placeholder string
        // would just hallucinate a product.
        if ocr_text.trim().is_empty() || ocr_text == OCR_FAILURE_PLACEHOLDER {
            return ProductAnalysis::degraded(ocr_text.to_lowercase(), "OCR failed");
        }

        let messages = vec![
            serde_json::json!({"role": "system", "content": ANALYSIS_SYSTEM_PROMPT}),
            serde_json::json!({"role": "user", "content": analysis_prompt(ocr_text, prefs)}),
        ];

        match self
            .chat_completion(
                messages,
                self.config.analysis_temperature,
                self.config.analysis_max_tokens,
            )
            .await
        {
            Ok(reply) => {
                debug!(reply_len = reply.len(), "Received analysis reply");
                parse_analysis(&reply, ocr_text)
            }
            Err(LlmError::EmptyResponse) => {
                warn!("Model returned an empty analysis");
                ProductAnalysis::degraded(ocr_text.to_lowercase(), "Empty response")
            }
            Err(e) => {
                warn!("Analysis call failed: {}", e);
                ProductAnalysis::degraded(ocr_text.to_lowercase(), e.to_string())
            }
        }
    }

    async fn chat(&self, query: &str, context: &str) -> String {
        if query.trim().is_empty() {
            return EMPTY_QUERY_REPLY.to_string();
        }

        let messages = vec![
            serde_json::json!({"role": "system", "content": chat_system_prompt(context)}),
            serde_json::json!({"role": "user", "content": query}),
        ];

        match self
            .chat_completion(
                messages,
                self.config.chat_temperature,
                self.config.chat_max_tokens,
            )
            .await
        {
            Ok(reply) => reply.trim().to_string(),
            Err(LlmError::EmptyResponse) => EMPTY_MODEL_REPLY.to_string(),
            Err(e) => {
                warn!("Chat call failed: {}", e);
                CHAT_FAILURE_REPLY.to_string()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    #[serde(default)]
    choices: Vec<ReplyChoice>,
}

#[derive(Debug, Deserialize)]
struct ReplyChoice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}
