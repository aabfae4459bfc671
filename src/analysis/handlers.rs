use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{AnalyzeRequest, DailyNutrientsResponse, SummarizeRequest, SummaryResponse},
    repo_types::FoodAnalysis,
    services,
};
use crate::{
    dates::parse_date,
    error::AppError,
    extract::{AppJson, AppPath},
    owner::Owner,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ai/analyze", post(analyze_food_log))
        .route("/ai/summarize", post(summarize_day))
        .route("/ai/nutrients/:date", get(daily_nutrients))
}

#[instrument(skip(state))]
pub async fn analyze_food_log(
    State(state): State<AppState>,
    Owner(owner): Owner,
    AppJson(body): AppJson<AnalyzeRequest>,
) -> Result<Json<FoodAnalysis>, AppError> {
    let analysis = services::analyze_entry(&state, owner, body.food_log_id).await?;
    Ok(Json(analysis))
}

#[instrument(skip(state))]
pub async fn summarize_day(
    State(state): State<AppState>,
    Owner(owner): Owner,
    AppJson(body): AppJson<SummarizeRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let summary = services::summarize_day(&state, owner, body.date).await?;
    Ok(Json(SummaryResponse {
        summary,
        date: body.date,
    }))
}

#[instrument(skip(state))]
pub async fn daily_nutrients(
    State(state): State<AppState>,
    Owner(owner): Owner,
    AppPath(raw_date): AppPath<String>,
) -> Result<Json<DailyNutrientsResponse>, AppError> {
    let date = parse_date(&raw_date)?;
    let summary = services::daily_summary(&state, owner, date).await?;
    Ok(Json(DailyNutrientsResponse::new(date, summary)))
}
