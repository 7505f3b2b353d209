//! Parsing model replies into [`ProductAnalysis`].
//!
//! Models wrap JSON in markdown fences often enough that stripping them is
//! part of the contract. Parse failures degrade to an analysis shell with
//! the `error` field set; they never propagate as errors.

use ecoscan_core::ProductAnalysis;
use tracing::warn;

/// Strip a leading ```json / ``` fence and a trailing ``` fence, if present
pub fn strip_code_fences(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse a model reply into an analysis, attaching the lowercased OCR text.
///
/// Empty or malformed replies yield a degraded analysis instead of an error.
pub fn parse_analysis(reply: &str, ocr_text: &str) -> ProductAnalysis {
    let raw_text = ocr_text.to_lowercase();
    let json_str = strip_code_fences(reply);

    if json_str.is_empty() {
        warn!("Model returned no JSON content");
        return ProductAnalysis::degraded(raw_text, "Empty response");
    }

    match serde_json::from_str::<ProductAnalysis>(json_str) {
        Ok(mut analysis) => {
            analysis.raw_text = raw_text;
            analysis
        }
        Err(e) => {
            warn!("Failed to parse model JSON: {}", e);
            ProductAnalysis::degraded(raw_text, format!("Invalid JSON from model: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoscan_core::Verdict;

    const REPLY: &str = r#"{"product_name": "Oat Bar", "health_score": 82, "verdict": "safe"}"#;

    #[test]
    fn plain_json_parses() {
        let analysis = parse_analysis(REPLY, "OAT BAR Ingredients");
        assert_eq!(analysis.product_name, "Oat Bar");
        assert_eq!(analysis.health_score, 82);
        assert_eq!(analysis.verdict, Verdict::Safe);
        assert_eq!(analysis.raw_text, "oat bar ingredients");
        assert!(!analysis.is_degraded());
    }

    #[test]
    fn json_fence_is_stripped() {
        let fenced = format!("```json\n{}\n```", REPLY);
        let analysis = parse_analysis(&fenced, "text");
        assert_eq!(analysis.product_name, "Oat Bar");
    }

    #[test]
    fn bare_fence_is_stripped() {
        let fenced = format!("```\n{}\n```", REPLY);
        let analysis = parse_analysis(&fenced, "text");
        assert_eq!(analysis.product_name, "Oat Bar");
    }

    #[test]
    fn malformed_json_degrades() {
        let analysis = parse_analysis("{not json", "SOME TEXT");
        assert!(analysis.is_degraded());
        assert_eq!(analysis.raw_text, "some text");
        assert!(analysis.error.as_deref().unwrap().starts_with("Invalid JSON"));
    }

    #[test]
    fn empty_reply_degrades() {
        let analysis = parse_analysis("   ", "text");
        assert_eq!(analysis.error.as_deref(), Some("Empty response"));
    }

    #[test]
    fn fence_only_reply_degrades() {
        let analysis = parse_analysis("```json\n```", "text");
        assert_eq!(analysis.error.as_deref(), Some("Empty response"));
    }
}
