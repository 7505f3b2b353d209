//! Prompt construction.
//!
//! The analysis prompt is a single fixed template: role preamble, the
//! user's (lowercased) preference profile as JSON, the OCR text, numbered
//! instructions, and the exact JSON schema the model must emit. Keeping the
//! schema inline in the prompt is what makes the reply parseable without a
//! grammar-constrained decoder.

use ecoscan_core::UserPreferences;

/// System message for the analysis call
pub const ANALYSIS_SYSTEM_PROMPT: &str =
    "You are a precise and helpful food safety AI assistant. Always return valid JSON.";

/// Build the full analysis prompt for one scanned label
pub fn analysis_prompt(ocr_text: &str, prefs: &UserPreferences) -> String {
    let prefs_json = serde_json::to_string_pretty(&prefs.lowercased())
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        "You are an expert AI Food Risk Analyst. \
         Analyze the following OCR text from a food product label and the user's health preferences. \
         Provide a COMPLETE risk analysis and structured data extraction in valid JSON format.\
         \n\nUSER PREFERENCES:\n{prefs_json}\n\n\
         OCR TEXT:\n{ocr_text}\n\n\
         INSTRUCTIONS:\n\
         1. Extract Product Details: Name, description, ingredients (with percentage if available), nutritional facts per 100g/serving.\n\
         2. Analyze Ingredients: Identify allergens, additives, and compatibility with the user's diet (e.g., Vegan, Keto).\n\
         3. Personalize Risk: Compare ingredients against User Preferences (Health Conditions, Allergies, Ingredients to Avoid).\n\
         4. Compute Scores (0-100):\n\
            - health_score: STRICTLY based on the personalized risk assessment. If the product contains User's allergens or conflicts with health conditions, the score MUST be low (0-40). If it fits the diet perfectly, it can be high.\n\
            - eco_score: Estimate environmental impact based on ingredients/packaging hints (0-100).\n\
         5. Generate Verdicts: 'safe', 'warning', or 'avoid'.\n\
         6. Provide 3-4 short, specific 'nutritional_benefits' and 'personalized_notes' (warnings/benefits).\n\
         7. Explain the Eco Score: Provide a specific sentence on WHY this eco score was given (e.g., 'High footprint due to palm oil' or 'Sustainable packaging detected').\n\
         8. Output strictly valid JSON matching the schema below. No markdown formatting.\n\n\
         JSON SCHEMA:\n\
         {{\n\
           \"product_name\": \"string\",\n\
           \"product_description\": \"string\",\n\
           \"ingredients\": [{{ \"name\": \"string\", \"percentage\": \"string\", \"allergen\": boolean }}],\n\
           \"nutritional_facts\": {{ \"calories\": \"val\", \"protein\": \"val\", \"carbs\": \"val\", \"sugar\": \"val\", \"fat\": \"val\", \"fiber\": \"val\", \"salt\": \"val\" }},\n\
           \"health_score\": integer,\n\
           \"eco_score\": integer,\n\
           \"eco_score_reasoning\": \"string\",\n\
           \"verdict\": \"safe | warning | avoid\",\n\
           \"nutritional_benefits\": [\"string\"],\n\
           \"personalized_notes\": [\"string\"],\n\
           \"detected_allergens\": [\"string\"],\n\
           \"other_info\": {{ \"brand\": \"string\", \"origin\": \"string\", \"certifications\": [\"string\"] }},\n\
           \"reasoning\": \"string (brief summary of why this score/verdict)\"\n\
         }}"
    )
}

/// System message for the follow-up chat, embedding the scan context
pub fn chat_system_prompt(context: &str) -> String {
    format!(
        "You are EcoScan Assistant, a helpful food safety expert. \
         Context: {context}. \
         Instructions: \
         1. If the user says 'hi', 'hello', or greets you, reply naturally and briefly offering help (e.g., 'Hi! Ask me about this product.'). \
         2. If the user asks about the product, ingredients, or health/eco scores, use the provided context to answer. \
         3. Keep responses short (1-2 sentences). No markdown."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_embeds_lowercased_prefs_and_ocr_text() {
        let prefs = UserPreferences {
            health_conditions: "Diabetes".into(),
            allergies: "Peanuts".into(),
            diet_type: "Vegan".into(),
            ingredients_to_avoid: "Palm Oil".into(),
        };
        let prompt = analysis_prompt("SUGAR, COCOA BUTTER", &prefs);

        assert!(prompt.contains("\"diabetes\""));
        assert!(prompt.contains("\"peanuts\""));
        assert!(!prompt.contains("Diabetes"));
        assert!(prompt.contains("OCR TEXT:\nSUGAR, COCOA BUTTER"));
    }

    #[test]
    fn analysis_prompt_lists_every_schema_key() {
        let prompt = analysis_prompt("text", &UserPreferences::default());
        for key in [
            "product_name",
            "product_description",
            "ingredients",
            "nutritional_facts",
            "health_score",
            "eco_score",
            "eco_score_reasoning",
            "verdict",
            "nutritional_benefits",
            "personalized_notes",
            "detected_allergens",
            "other_info",
            "reasoning",
        ] {
            assert!(prompt.contains(key), "schema key {} missing", key);
        }
        assert!(prompt.contains("safe | warning | avoid"));
    }

    #[test]
    fn chat_system_prompt_embeds_context() {
        let prompt = chat_system_prompt("Product: Oat Bar. Health Score: 80/100.");
        assert!(prompt.contains("Context: Product: Oat Bar. Health Score: 80/100."));
        assert!(prompt.contains("No markdown"));
    }
}
