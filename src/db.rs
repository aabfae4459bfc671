use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::Date;

use crate::{
    analysis::{
        self,
        repo_types::{FoodAnalysis, NutrientEstimate},
    },
    config::AppConfig,
    diet_plan::{self, repo_types::DietPlan},
    food_logs::{
        self,
        repo_types::{FoodLog, NewFoodLog},
    },
    store::FoodStore,
};

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

pub async fn run_migrations(db: &PgPool) {
    if let Err(e) = sqlx::migrate!("./migrations").run(db).await {
        tracing::warn!(error = %e, "migration failed; continuing with existing schema");
    }
}

/// Postgres-backed [`FoodStore`].
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FoodStore for PgStore {
    async fn create_log(&self, owner: i64, log: &NewFoodLog) -> anyhow::Result<FoodLog> {
        food_logs::repo::insert(&self.db, owner, log).await
    }

    async fn get_log(&self, owner: i64, id: i64) -> anyhow::Result<Option<FoodLog>> {
        food_logs::repo::find(&self.db, owner, id).await
    }

    async fn list_logs(&self, owner: i64, date: Option<Date>) -> anyhow::Result<Vec<FoodLog>> {
        food_logs::repo::list(&self.db, owner, date).await
    }

    async fn list_logs_between(
        &self,
        owner: i64,
        start: Date,
        end: Date,
    ) -> anyhow::Result<Vec<FoodLog>> {
        food_logs::repo::list_between(&self.db, owner, start, end).await
    }

    async fn update_log(
        &self,
        owner: i64,
        id: i64,
        log: &NewFoodLog,
    ) -> anyhow::Result<Option<FoodLog>> {
        food_logs::repo::replace(&self.db, owner, id, log).await
    }

    async fn delete_log(&self, owner: i64, id: i64) -> anyhow::Result<bool> {
        food_logs::repo::delete(&self.db, owner, id).await
    }

    async fn get_analysis(&self, food_log_id: i64) -> anyhow::Result<Option<FoodAnalysis>> {
        analysis::repo::find_by_log(&self.db, food_log_id).await
    }

    async fn analyses_for(
        &self,
        food_log_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, FoodAnalysis>> {
        analysis::repo::find_by_logs(&self.db, food_log_ids).await
    }

    async fn insert_analysis(
        &self,
        food_log_id: i64,
        estimate: &NutrientEstimate,
    ) -> anyhow::Result<FoodAnalysis> {
        analysis::repo::insert_once(&self.db, food_log_id, estimate).await
    }

    async fn latest_plan(&self, owner: i64) -> anyhow::Result<Option<DietPlan>> {
        diet_plan::repo::latest(&self.db, owner).await
    }

    async fn save_plan(&self, owner: i64, recommendations: &str) -> anyhow::Result<DietPlan> {
        diet_plan::repo::save(&self.db, owner, recommendations).await
    }
}
