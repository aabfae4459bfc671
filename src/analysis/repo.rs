use std::collections::HashMap;

use anyhow::Context;
use sqlx::PgPool;

use crate::analysis::repo_types::{FoodAnalysis, NutrientEstimate};

const COLUMNS: &str = "id, food_log_id, calories, protein, carbs, fats, fiber, summary, created_at";

pub async fn find_by_log(db: &PgPool, food_log_id: i64) -> anyhow::Result<Option<FoodAnalysis>> {
    let row = sqlx::query_as::<_, FoodAnalysis>(&format!(
        "SELECT {COLUMNS} FROM food_analyses WHERE food_log_id = $1"
    ))
    .bind(food_log_id)
    .fetch_optional(db)
    .await
    .context("find food analysis")?;
    Ok(row)
}

pub async fn find_by_logs(
    db: &PgPool,
    food_log_ids: &[i64],
) -> anyhow::Result<HashMap<i64, FoodAnalysis>> {
    if food_log_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, FoodAnalysis>(&format!(
        "SELECT {COLUMNS} FROM food_analyses WHERE food_log_id = ANY($1)"
    ))
    .bind(food_log_ids)
    .fetch_all(db)
    .await
    .context("list food analyses")?;
    Ok(rows.into_iter().map(|a| (a.food_log_id, a)).collect())
}

/// Insert-if-absent keyed by `food_log_id`. The unique constraint decides
/// concurrent races; every caller gets back the single stored row.
pub async fn insert_once(
    db: &PgPool,
    food_log_id: i64,
    estimate: &NutrientEstimate,
) -> anyhow::Result<FoodAnalysis> {
    sqlx::query(
        r#"
        INSERT INTO food_analyses (food_log_id, calories, protein, carbs, fats, fiber, summary)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (food_log_id) DO NOTHING
        "#,
    )
    .bind(food_log_id)
    .bind(estimate.calories)
    .bind(estimate.protein)
    .bind(estimate.carbs)
    .bind(estimate.fats)
    .bind(estimate.fiber)
    .bind(&estimate.summary)
    .execute(db)
    .await
    .context("insert food analysis")?;

    find_by_log(db, food_log_id)
        .await?
        .context("food analysis missing after insert")
}
