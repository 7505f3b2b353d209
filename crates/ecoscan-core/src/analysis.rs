//! Structured product analysis as produced by the language model.
//!
//! The model is prompted for a fixed JSON schema; deserialization is
//! deliberately tolerant because model output omits fields more often than
//! it invents them. Missing scores fall back to a neutral 50.

use crate::error::CoreError;
use crate::user::UserPreferences;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder text stored when OCR could not extract anything usable.
///
/// The scan pipeline degrades to this string instead of failing the request,
/// and the analysis step short-circuits when it sees it.
pub const OCR_FAILURE_PLACEHOLDER: &str =
    "OCR failed: Unable to extract text. Please try again.";

/// Categorical risk judgment for a scanned product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    #[default]
    Warning,
    Avoid,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Warning => "warning",
            Verdict::Avoid => "avoid",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "safe" => Ok(Verdict::Safe),
            "warning" => Ok(Verdict::Warning),
            "avoid" => Ok(Verdict::Avoid),
            other => Err(CoreError::UnknownVerdict(other.to_string())),
        }
    }
}

/// Single ingredient entry extracted from the label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Ingredient {
    #[serde(default)]
    pub name: String,
    /// Percentage as printed on the label, when present (e.g. "12%")
    #[serde(default)]
    pub percentage: String,
    #[serde(default)]
    pub allergen: bool,
}

/// Nutritional values per 100g/serving, kept as strings since label text
/// is too unreliable to parse into numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NutritionalFacts {
    #[serde(default)]
    pub calories: String,
    #[serde(default)]
    pub protein: String,
    #[serde(default)]
    pub carbs: String,
    #[serde(default)]
    pub sugar: String,
    #[serde(default)]
    pub fat: String,
    #[serde(default)]
    pub fiber: String,
    #[serde(default)]
    pub salt: String,
}

/// Secondary product metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OtherInfo {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub certifications: Vec<String>,
}

fn default_score() -> i64 {
    50
}

fn default_product_name() -> String {
    "Unknown Product".to_string()
}

/// Full structured analysis of a scanned product label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAnalysis {
    #[serde(default = "default_product_name")]
    pub product_name: String,
    #[serde(default)]
    pub product_description: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub nutritional_facts: NutritionalFacts,
    #[serde(default = "default_score")]
    pub health_score: i64,
    #[serde(default = "default_score")]
    pub eco_score: i64,
    #[serde(default)]
    pub eco_score_reasoning: String,
    #[serde(default)]
    pub verdict: Verdict,
    #[serde(default)]
    pub nutritional_benefits: Vec<String>,
    #[serde(default)]
    pub personalized_notes: Vec<String>,
    #[serde(default)]
    pub detected_allergens: Vec<String>,
    #[serde(default)]
    pub other_info: OtherInfo,
    #[serde(default)]
    pub reasoning: String,
    /// Lowercased OCR text the analysis was derived from
    #[serde(default)]
    pub raw_text: String,
    /// Set when OCR or the model call failed; the analysis is then a shell
    /// around `raw_text` and this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for ProductAnalysis {
    fn default() -> Self {
        Self {
            product_name: default_product_name(),
            product_description: String::new(),
            ingredients: Vec::new(),
            nutritional_facts: NutritionalFacts::default(),
            health_score: default_score(),
            eco_score: default_score(),
            eco_score_reasoning: String::new(),
            verdict: Verdict::default(),
            nutritional_benefits: Vec::new(),
            personalized_notes: Vec::new(),
            detected_allergens: Vec::new(),
            other_info: OtherInfo::default(),
            reasoning: String::new(),
            raw_text: String::new(),
            error: None,
        }
    }
}

impl ProductAnalysis {
    /// Degraded analysis produced when OCR or the model call failed
    pub fn degraded(raw_text: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Build the chat context string summarizing a completed scan.
///
/// The chat endpoint receives this back from the client verbatim, so the
/// format is part of the API surface.
pub fn chat_context(analysis: &ProductAnalysis, prefs: &UserPreferences) -> String {
    let eco_reasoning = if analysis.eco_score_reasoning.is_empty() {
        "No reasoning provided"
    } else {
        &analysis.eco_score_reasoning
    };
    format!(
        "Product: {}. Health Score: {}/100. Eco Score: {}/100 ({}). Verdict: {}. \
         Benefits: {}. Warnings: {}. User Preferences Applied: {}, {}.",
        analysis.product_name,
        analysis.health_score,
        analysis.eco_score,
        eco_reasoning,
        analysis.verdict,
        analysis.nutritional_benefits.join(", "),
        analysis.personalized_notes.join(", "),
        prefs.health_conditions.to_lowercase(),
        prefs.allergies.to_lowercase(),
    )
}
