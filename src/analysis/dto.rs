use serde::{Deserialize, Serialize};
use time::Date;

use super::services::DailySummary;
use crate::dates::{format_date, iso_date};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub food_log_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(with = "iso_date")]
    pub date: Date,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    #[serde(with = "iso_date")]
    pub date: Date,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DailyNutrientsResponse {
    NoEntries {
        date: String,
    },
    Logged {
        date: String,
        entries: usize,
        calories: f64,
        protein: f64,
        carbs: f64,
        fats: f64,
        fiber: f64,
    },
}

impl DailyNutrientsResponse {
    pub fn new(date: Date, summary: DailySummary) -> Self {
        let date = format_date(date);
        match summary {
            DailySummary::NoEntries => Self::NoEntries { date },
            DailySummary::Logged { entries, totals } => Self::Logged {
                date,
                entries: entries.len(),
                calories: totals.calories,
                protein: totals.protein,
                carbs: totals.carbs,
                fats: totals.fats,
                fiber: totals.fiber,
            },
        }
    }
}
