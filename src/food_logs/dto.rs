use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use time::Date;

use crate::{
    dates::{blank_as_none, iso_date},
    error::AppError,
    food_logs::repo_types::{MealTime, NewFoodLog},
};

/// Request body for creating or replacing a food log.
#[derive(Debug, Deserialize)]
pub struct FoodLogInput {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub meal_time: MealTime,
    pub food_description: String,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FoodLogFilter {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date: Option<Date>,
}

fn is_valid_clock_time(raw: &str) -> bool {
    lazy_static! {
        static ref CLOCK_RE: Regex = Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap();
    }
    CLOCK_RE.is_match(raw)
}

impl FoodLogInput {
    pub fn validate(self) -> Result<NewFoodLog, AppError> {
        let food_description = self.food_description.trim().to_string();
        if food_description.is_empty() {
            return Err(AppError::Validation(
                "food_description must not be empty".into(),
            ));
        }

        let time = match self.time.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(t) if is_valid_clock_time(t) => Some(t.to_string()),
            Some(t) => {
                return Err(AppError::Validation(format!(
                    "invalid time '{t}', expected HH:MM"
                )))
            }
        };

        Ok(NewFoodLog {
            date: self.date,
            meal_time: self.meal_time,
            time,
            food_description,
        })
    }
}
