use std::collections::{BTreeMap, HashMap};

use anyhow::Context;
use time::{Date, Duration};
use tracing::{info, instrument, warn};

use crate::{
    ai::{self, prompts, AiOutcome, CompletionRequest, ReasoningEngine},
    analysis::repo_types::FoodAnalysis,
    diet_plan::repo_types::{DietPlan, Recommendations},
    error::AppError,
    food_logs::repo_types::{FoodLog, MealTime},
    state::AppState,
};

/// Length of the history window in calendar days, end date included.
pub const WINDOW_DAYS: i64 = 5;
/// Distinct logged days required before a plan can be generated.
pub const MIN_DISTINCT_DAYS: usize = 3;

pub const INSUFFICIENT_HISTORY: &str =
    "Need at least 3 days of food logs to generate a diet plan";

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedMeal {
    pub meal_time: MealTime,
    pub time: Option<String>,
    pub food_description: String,
    /// `None` when the entry has not been analyzed.
    pub calories: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayLog {
    pub date: Date,
    pub meals: Vec<LoggedMeal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NutrientAverages {
    /// Per-day calorie sums averaged over distinct days; unanalyzed
    /// entries count as zero.
    pub avg_calories: f64,
    /// Means over analyzed entries only; `None` when nothing is analyzed.
    pub avg_protein: Option<f64>,
    pub avg_carbs: Option<f64>,
    pub avg_fats: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowAggregate {
    pub days: Vec<DayLog>,
    pub averages: NutrientAverages,
}

/// Inclusive `[end - 4 days, end]`.
pub fn window_bounds(end: Date) -> Result<(Date, Date), AppError> {
    let start = end
        .checked_sub(Duration::days(WINDOW_DAYS - 1))
        .ok_or_else(|| AppError::BadRequest("end date out of range".into()))?;
    Ok((start, end))
}

pub fn aggregate_window(
    logs: &[FoodLog],
    analyses: &HashMap<i64, FoodAnalysis>,
) -> Result<WindowAggregate, AppError> {
    let mut by_date: BTreeMap<Date, Vec<LoggedMeal>> = BTreeMap::new();
    for log in logs {
        by_date.entry(log.date).or_default().push(LoggedMeal {
            meal_time: log.meal_time,
            time: log.time.clone(),
            food_description: log.food_description.clone(),
            calories: analyses.get(&log.id).map(|a| a.calories),
        });
    }

    if by_date.len() < MIN_DISTINCT_DAYS {
        return Err(AppError::Validation(INSUFFICIENT_HISTORY.into()));
    }

    let day_count = by_date.len() as f64;
    let calorie_sum: f64 = by_date
        .values()
        .flat_map(|meals| meals.iter().map(|m| m.calories.unwrap_or(0.0)))
        .sum();

    let analyzed: Vec<&FoodAnalysis> = logs.iter().filter_map(|l| analyses.get(&l.id)).collect();
    let mean = |pick: fn(&FoodAnalysis) -> f64| -> Option<f64> {
        if analyzed.is_empty() {
            None
        } else {
            Some(analyzed.iter().map(|a| pick(a)).sum::<f64>() / analyzed.len() as f64)
        }
    };

    let averages = NutrientAverages {
        avg_calories: calorie_sum / day_count,
        avg_protein: mean(|a| a.protein),
        avg_carbs: mean(|a| a.carbs),
        avg_fats: mean(|a| a.fats),
    };

    let days = by_date
        .into_iter()
        .map(|(date, meals)| DayLog { date, meals })
        .collect();

    Ok(WindowAggregate { days, averages })
}

#[instrument(skip(state))]
pub async fn load_window(
    state: &AppState,
    owner: i64,
    end: Date,
) -> Result<WindowAggregate, AppError> {
    let (start, end) = window_bounds(end)?;
    let logs = state.store.list_logs_between(owner, start, end).await?;
    let ids: Vec<i64> = logs.iter().map(|l| l.id).collect();
    let analyses = state.store.analyses_for(&ids).await?;
    aggregate_window(&logs, &analyses)
}

pub async fn generate_recommendations(
    engine: &dyn ReasoningEngine,
    window: &WindowAggregate,
) -> AiOutcome<Recommendations> {
    let request = CompletionRequest {
        system: prompts::RECOMMENDATION_SYSTEM,
        prompt: prompts::diet_recommendations(&window.days, &window.averages),
        temperature: 0.5,
        json_output: true,
    };
    ai::complete_json(engine, request, Recommendations::unavailable).await
}

/// Builds recommendations from the window ending at `end` and stores them
/// as the owner's current plan.
#[instrument(skip(state))]
pub async fn generate_plan(state: &AppState, owner: i64, end: Date) -> Result<DietPlan, AppError> {
    let window = load_window(state, owner, end).await?;

    let outcome = generate_recommendations(state.engine.as_ref(), &window).await;
    if outcome.is_degraded() {
        warn!(owner, "storing fallback recommendations");
    }
    let payload = serde_json::to_string(outcome.value()).context("serialize recommendations")?;

    let plan = state.store.save_plan(owner, &payload).await?;
    info!(owner, plan_id = plan.id, days = window.days.len(), "diet plan saved");
    Ok(plan)
}

#[instrument(skip(state))]
pub async fn current_plan(state: &AppState, owner: i64) -> Result<DietPlan, AppError> {
    state
        .store
        .latest_plan(owner)
        .await?
        .ok_or_else(|| AppError::NotFound("No diet plan found. Generate one first.".into()))
}
