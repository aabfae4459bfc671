use anyhow::Context;
use sqlx::PgPool;

use crate::diet_plan::repo_types::DietPlan;

pub async fn latest(db: &PgPool, owner: i64) -> anyhow::Result<Option<DietPlan>> {
    let plan = sqlx::query_as::<_, DietPlan>(
        r#"
        SELECT id, user_id, recommendations, created_at, updated_at
          FROM diet_plans
         WHERE user_id = $1
         ORDER BY created_at DESC, id DESC
         LIMIT 1
        "#,
    )
    .bind(owner)
    .fetch_optional(db)
    .await
    .context("find latest diet plan")?;
    Ok(plan)
}

/// Overwrites the owner's most recent plan, inserting one if none exists.
/// Read-then-write: two concurrent first saves may both insert.
pub async fn save(db: &PgPool, owner: i64, recommendations: &str) -> anyhow::Result<DietPlan> {
    let updated = sqlx::query_as::<_, DietPlan>(
        r#"
        UPDATE diet_plans
           SET recommendations = $2,
               updated_at = now()
         WHERE id = (
               SELECT id FROM diet_plans
                WHERE user_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT 1)
        RETURNING id, user_id, recommendations, created_at, updated_at
        "#,
    )
    .bind(owner)
    .bind(recommendations)
    .fetch_optional(db)
    .await
    .context("update diet plan")?;

    if let Some(plan) = updated {
        return Ok(plan);
    }

    let plan = sqlx::query_as::<_, DietPlan>(
        r#"
        INSERT INTO diet_plans (user_id, recommendations)
        VALUES ($1, $2)
        RETURNING id, user_id, recommendations, created_at, updated_at
        "#,
    )
    .bind(owner)
    .bind(recommendations)
    .fetch_one(db)
    .await
    .context("insert diet plan")?;
    Ok(plan)
}
