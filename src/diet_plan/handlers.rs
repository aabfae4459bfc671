use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{dto::GenerateQuery, repo_types::DietPlan, services};
use crate::{
    dates::today_utc, error::AppError, extract::AppQuery, owner::Owner, state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/diet-plan", get(get_current_plan))
        .route("/diet-plan/generate", post(generate_plan))
}

#[instrument(skip(state))]
pub async fn generate_plan(
    State(state): State<AppState>,
    Owner(owner): Owner,
    AppQuery(query): AppQuery<GenerateQuery>,
) -> Result<Json<DietPlan>, AppError> {
    let end = query.end_date.unwrap_or_else(today_utc);
    let plan = services::generate_plan(&state, owner, end).await?;
    Ok(Json(plan))
}

#[instrument(skip(state))]
pub async fn get_current_plan(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<DietPlan>, AppError> {
    Ok(Json(services::current_plan(&state, owner).await?))
}
