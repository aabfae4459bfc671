use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use super::{
    dto::{FoodLogFilter, FoodLogInput},
    repo_types::FoodLog,
};
use crate::{
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    owner::Owner,
    state::AppState,
};

const NOT_FOUND: &str = "Food log not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/food-logs", get(list_food_logs).post(create_food_log))
        .route(
            "/food-logs/:id",
            get(get_food_log)
                .put(update_food_log)
                .delete(delete_food_log),
        )
}

#[instrument(skip(state, body))]
pub async fn create_food_log(
    State(state): State<AppState>,
    Owner(owner): Owner,
    AppJson(body): AppJson<FoodLogInput>,
) -> Result<(StatusCode, Json<FoodLog>), AppError> {
    let new_log = body.validate()?;
    let log = state.store.create_log(owner, &new_log).await?;
    info!(owner, id = log.id, "food log created");
    Ok((StatusCode::CREATED, Json(log)))
}

#[instrument(skip(state))]
pub async fn list_food_logs(
    State(state): State<AppState>,
    Owner(owner): Owner,
    AppQuery(filter): AppQuery<FoodLogFilter>,
) -> Result<Json<Vec<FoodLog>>, AppError> {
    let logs = state.store.list_logs(owner, filter.date).await?;
    Ok(Json(logs))
}

#[instrument(skip(state))]
pub async fn get_food_log(
    State(state): State<AppState>,
    Owner(owner): Owner,
    AppPath(id): AppPath<i64>,
) -> Result<Json<FoodLog>, AppError> {
    state
        .store
        .get_log(owner, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
}

#[instrument(skip(state, body))]
pub async fn update_food_log(
    State(state): State<AppState>,
    Owner(owner): Owner,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<FoodLogInput>,
) -> Result<Json<FoodLog>, AppError> {
    let new_log = body.validate()?;
    state
        .store
        .update_log(owner, id, &new_log)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
}

#[instrument(skip(state))]
pub async fn delete_food_log(
    State(state): State<AppState>,
    Owner(owner): Owner,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_log(owner, id).await? {
        info!(owner, id, "food log deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(NOT_FOUND.into()))
    }
}
