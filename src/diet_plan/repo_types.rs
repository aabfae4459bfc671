use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Current diet plan of an owner. `recommendations` holds the serialized
/// [`Recommendations`] JSON.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct DietPlan {
    pub id: i64,
    pub user_id: i64,
    pub recommendations: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighCalorieFood {
    pub food: String,
    pub calories: f64,
    pub issue: String,
    pub replacement: String,
    pub replacement_calories: f64,
    pub benefit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendations {
    pub high_calorie_foods: Vec<HighCalorieFood>,
    pub general_recommendations: Vec<String>,
    pub meal_timing_suggestions: String,
}

impl Recommendations {
    pub fn unavailable(reason: &str) -> Self {
        Self {
            high_calorie_foods: Vec::new(),
            general_recommendations: vec![format!(
                "Unable to generate recommendations: {reason}"
            )],
            meal_timing_suggestions: String::new(),
        }
    }
}
