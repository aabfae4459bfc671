use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Stored nutrient analysis; at most one per food log.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct FoodAnalysis {
    pub id: i64,
    pub food_log_id: i64,
    pub calories: f64,
    pub protein: f64, // g
    pub carbs: f64,   // g
    pub fats: f64,    // g
    pub fiber: f64,   // g
    pub summary: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Nutrient estimate as produced by the reasoning engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientEstimate {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
    pub summary: String,
}

impl NutrientEstimate {
    pub fn zeroed(summary: String) -> Self {
        Self {
            summary,
            ..Self::default()
        }
    }

    /// Forces every nutrient to a finite, non-negative value.
    pub fn sanitized(self) -> Self {
        fn clamp(v: f64) -> f64 {
            if v.is_finite() && v > 0.0 {
                v
            } else {
                0.0
            }
        }
        Self {
            calories: clamp(self.calories),
            protein: clamp(self.protein),
            carbs: clamp(self.carbs),
            fats: clamp(self.fats),
            fiber: clamp(self.fiber),
            summary: self.summary,
        }
    }
}
