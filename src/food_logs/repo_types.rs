use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use crate::dates::iso_date;

/// Meal-time category; variant order is the display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "meal_time", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MealTime {
    Morning,
    Afternoon,
    Evening,
}

impl MealTime {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealTime::Morning => "morning",
            MealTime::Afternoon => "afternoon",
            MealTime::Evening => "evening",
        }
    }
}

impl fmt::Display for MealTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Food log record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct FoodLog {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(rename = "log_date")]
    #[serde(with = "iso_date")]
    pub date: Date,
    pub meal_time: MealTime,
    #[sqlx(rename = "log_time")]
    pub time: Option<String>, // HH:MM
    pub food_description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Validated payload for inserting or replacing a food log.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodLog {
    pub date: Date,
    pub meal_time: MealTime,
    pub time: Option<String>,
    pub food_description: String,
}
