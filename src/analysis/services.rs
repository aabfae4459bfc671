use std::collections::HashMap;

use time::Date;
use tracing::{debug, info, instrument, warn};

use crate::{
    ai::{self, prompts, AiOutcome, CompletionRequest, ReasoningEngine},
    analysis::repo_types::{FoodAnalysis, NutrientEstimate},
    error::AppError,
    food_logs::repo_types::{FoodLog, MealTime},
    state::AppState,
};

/// Turns one food description into a nutrient estimate. Never fails: an
/// engine or decode failure yields zeros and an "Unable to analyze" summary.
pub async fn extract_nutrients(
    engine: &dyn ReasoningEngine,
    food_description: &str,
) -> AiOutcome<NutrientEstimate> {
    let request = CompletionRequest {
        system: prompts::NUTRITION_SYSTEM,
        prompt: prompts::nutrient_analysis(food_description),
        temperature: 0.3,
        json_output: true,
    };
    match ai::complete_json(engine, request, |reason| {
        NutrientEstimate::zeroed(format!("Unable to analyze: {reason}"))
    })
    .await
    {
        AiOutcome::Parsed(estimate) => AiOutcome::Parsed(estimate.sanitized()),
        degraded => degraded,
    }
}

/// Returns the entry's analysis, asking the engine only when none is stored.
#[instrument(skip(state))]
pub async fn analyze_entry(
    state: &AppState,
    owner: i64,
    food_log_id: i64,
) -> Result<FoodAnalysis, AppError> {
    let log = state
        .store
        .get_log(owner, food_log_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Food log not found".into()))?;

    if let Some(existing) = state.store.get_analysis(log.id).await? {
        debug!(food_log_id, "analysis already stored");
        return Ok(existing);
    }

    let outcome = extract_nutrients(state.engine.as_ref(), &log.food_description).await;
    if outcome.is_degraded() {
        warn!(food_log_id, "storing fallback analysis");
    }
    let stored = state
        .store
        .insert_analysis(log.id, outcome.value())
        .await?;

    info!(food_log_id, analysis_id = stored.id, "food log analyzed");
    Ok(stored)
}

/// Projection of one entry used for summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryProjection {
    pub meal_time: MealTime,
    pub time: Option<String>,
    pub food_description: String,
    pub calories: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
}

impl NutrientTotals {
    fn add(&mut self, a: &FoodAnalysis) {
        self.calories += a.calories;
        self.protein += a.protein;
        self.carbs += a.carbs;
        self.fats += a.fats;
        self.fiber += a.fiber;
    }

    fn rounded(self) -> Self {
        fn r2(v: f64) -> f64 {
            (v * 100.0).round() / 100.0
        }
        Self {
            calories: r2(self.calories),
            protein: r2(self.protein),
            carbs: r2(self.carbs),
            fats: r2(self.fats),
            fiber: r2(self.fiber),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DailySummary {
    /// Nothing was logged for the date.
    NoEntries,
    Logged {
        entries: Vec<EntryProjection>,
        totals: NutrientTotals,
    },
}

/// Sums the analyses of one day's logs. Logs without an analysis count as
/// zero for every nutrient.
pub fn aggregate_day(logs: &[FoodLog], analyses: &HashMap<i64, FoodAnalysis>) -> DailySummary {
    if logs.is_empty() {
        return DailySummary::NoEntries;
    }

    let mut totals = NutrientTotals::default();
    let entries = logs
        .iter()
        .map(|log| {
            let analysis = analyses.get(&log.id);
            if let Some(a) = analysis {
                totals.add(a);
            }
            EntryProjection {
                meal_time: log.meal_time,
                time: log.time.clone(),
                food_description: log.food_description.clone(),
                calories: analysis.map(|a| a.calories),
            }
        })
        .collect();

    DailySummary::Logged {
        entries,
        totals: totals.rounded(),
    }
}

#[instrument(skip(state))]
pub async fn daily_summary(
    state: &AppState,
    owner: i64,
    date: Date,
) -> Result<DailySummary, AppError> {
    let logs = state.store.list_logs(owner, Some(date)).await?;
    if logs.is_empty() {
        return Ok(DailySummary::NoEntries);
    }
    let ids: Vec<i64> = logs.iter().map(|l| l.id).collect();
    let analyses = state.store.analyses_for(&ids).await?;
    Ok(aggregate_day(&logs, &analyses))
}

pub const NOTHING_LOGGED: &str = "No food logged for this date.";

/// Free-text AI summary of one day's eating.
#[instrument(skip(state))]
pub async fn summarize_day(state: &AppState, owner: i64, date: Date) -> Result<String, AppError> {
    let entries = match daily_summary(state, owner, date).await? {
        DailySummary::NoEntries => return Ok(NOTHING_LOGGED.to_string()),
        DailySummary::Logged { entries, .. } => entries,
    };

    let request = CompletionRequest {
        system: prompts::DAILY_SUMMARY_SYSTEM,
        prompt: prompts::daily_summary(&entries),
        temperature: 0.5,
        json_output: false,
    };
    let outcome = ai::complete_text(state.engine.as_ref(), request, |reason| {
        format!("Unable to generate summary: {reason}")
    })
    .await;
    Ok(outcome.into_value())
}
