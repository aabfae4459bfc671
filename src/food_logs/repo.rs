use anyhow::Context;
use sqlx::PgPool;
use time::Date;

use crate::food_logs::repo_types::{FoodLog, NewFoodLog};

const COLUMNS: &str =
    "id, user_id, log_date, meal_time, log_time, food_description, created_at, updated_at";

pub async fn insert(db: &PgPool, owner: i64, log: &NewFoodLog) -> anyhow::Result<FoodLog> {
    let row = sqlx::query_as::<_, FoodLog>(&format!(
        r#"
        INSERT INTO food_logs (user_id, log_date, meal_time, log_time, food_description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(owner)
    .bind(log.date)
    .bind(log.meal_time)
    .bind(log.time.as_deref())
    .bind(&log.food_description)
    .fetch_one(db)
    .await
    .context("insert food log")?;
    Ok(row)
}

pub async fn find(db: &PgPool, owner: i64, id: i64) -> anyhow::Result<Option<FoodLog>> {
    let row = sqlx::query_as::<_, FoodLog>(&format!(
        r#"
        SELECT {COLUMNS}
          FROM food_logs
         WHERE id = $1 AND user_id = $2
        "#
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(db)
    .await
    .context("find food log")?;
    Ok(row)
}

/// Newest day first, meals in morning/afternoon/evening order within a day.
pub async fn list(db: &PgPool, owner: i64, date: Option<Date>) -> anyhow::Result<Vec<FoodLog>> {
    let rows = sqlx::query_as::<_, FoodLog>(&format!(
        r#"
        SELECT {COLUMNS}
          FROM food_logs
         WHERE user_id = $1
           AND ($2::date IS NULL OR log_date = $2)
         ORDER BY log_date DESC, meal_time, id
        "#
    ))
    .bind(owner)
    .bind(date)
    .fetch_all(db)
    .await
    .context("list food logs")?;
    Ok(rows)
}

/// Inclusive on both ends, oldest day first.
pub async fn list_between(
    db: &PgPool,
    owner: i64,
    start: Date,
    end: Date,
) -> anyhow::Result<Vec<FoodLog>> {
    let rows = sqlx::query_as::<_, FoodLog>(&format!(
        r#"
        SELECT {COLUMNS}
          FROM food_logs
         WHERE user_id = $1
           AND log_date BETWEEN $2 AND $3
         ORDER BY log_date, meal_time, id
        "#
    ))
    .bind(owner)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
    .context("list food logs in window")?;
    Ok(rows)
}

pub async fn replace(
    db: &PgPool,
    owner: i64,
    id: i64,
    log: &NewFoodLog,
) -> anyhow::Result<Option<FoodLog>> {
    let row = sqlx::query_as::<_, FoodLog>(&format!(
        r#"
        UPDATE food_logs
           SET log_date = $3,
               meal_time = $4,
               log_time = $5,
               food_description = $6,
               updated_at = now()
         WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner)
    .bind(log.date)
    .bind(log.meal_time)
    .bind(log.time.as_deref())
    .bind(&log.food_description)
    .fetch_optional(db)
    .await
    .context("update food log")?;
    Ok(row)
}

/// Removes the log and its analysis together. Returns `false` if the log
/// does not exist for this owner.
pub async fn delete(db: &PgPool, owner: i64, id: i64) -> anyhow::Result<bool> {
    let mut tx = db.begin().await.context("begin tx")?;

    sqlx::query(
        r#"
        DELETE FROM food_analyses
         WHERE food_log_id = (SELECT id FROM food_logs WHERE id = $1 AND user_id = $2)
        "#,
    )
    .bind(id)
    .bind(owner)
    .execute(&mut *tx)
    .await
    .context("delete food analysis")?;

    let deleted = sqlx::query("DELETE FROM food_logs WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(&mut *tx)
        .await
        .context("delete food log")?
        .rows_affected();

    tx.commit().await.context("commit tx")?;
    Ok(deleted > 0)
}
