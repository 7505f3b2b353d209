//! User accounts and the preference profile used to personalize analyses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dietary and health preferences embedded into the analysis prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub health_conditions: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default = "default_diet_type")]
    pub diet_type: String,
    #[serde(default)]
    pub ingredients_to_avoid: String,
}

fn default_diet_type() -> String {
    "general".to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            health_conditions: String::new(),
            allergies: String::new(),
            diet_type: default_diet_type(),
            ingredients_to_avoid: String::new(),
        }
    }
}

impl UserPreferences {
    /// Lowercased copy, the form embedded into prompts
    pub fn lowercased(&self) -> Self {
        Self {
            health_conditions: self.health_conditions.to_lowercase(),
            allergies: self.allergies.to_lowercase(),
            diet_type: self.diet_type.to_lowercase(),
            ingredients_to_avoid: self.ingredients_to_avoid.to_lowercase(),
        }
    }
}

/// A registered user
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub preferences: UserPreferences,
    pub created_at: DateTime<Utc>,
}
