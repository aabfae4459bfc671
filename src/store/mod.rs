use std::collections::HashMap;

use async_trait::async_trait;
use time::Date;

use crate::{
    analysis::repo_types::{FoodAnalysis, NutrientEstimate},
    diet_plan::repo_types::DietPlan,
    food_logs::repo_types::{FoodLog, NewFoodLog},
};

#[cfg(test)]
pub mod memory;

/// Persistence for food logs, their analyses and diet plans.
///
/// Every log and plan operation is scoped to an owner. Absence is reported
/// as `None`/`false`; errors mean the store itself failed.
#[async_trait]
pub trait FoodStore: Send + Sync {
    async fn create_log(&self, owner: i64, log: &NewFoodLog) -> anyhow::Result<FoodLog>;
    async fn get_log(&self, owner: i64, id: i64) -> anyhow::Result<Option<FoodLog>>;
    async fn list_logs(&self, owner: i64, date: Option<Date>) -> anyhow::Result<Vec<FoodLog>>;
    /// Logs with `start <= date <= end`, oldest first.
    async fn list_logs_between(
        &self,
        owner: i64,
        start: Date,
        end: Date,
    ) -> anyhow::Result<Vec<FoodLog>>;
    async fn update_log(
        &self,
        owner: i64,
        id: i64,
        log: &NewFoodLog,
    ) -> anyhow::Result<Option<FoodLog>>;
    async fn delete_log(&self, owner: i64, id: i64) -> anyhow::Result<bool>;

    async fn get_analysis(&self, food_log_id: i64) -> anyhow::Result<Option<FoodAnalysis>>;
    async fn analyses_for(&self, food_log_ids: &[i64])
        -> anyhow::Result<HashMap<i64, FoodAnalysis>>;
    /// Stores the estimate unless the log already has an analysis; returns
    /// whichever analysis ends up stored.
    async fn insert_analysis(
        &self,
        food_log_id: i64,
        estimate: &NutrientEstimate,
    ) -> anyhow::Result<FoodAnalysis>;

    async fn latest_plan(&self, owner: i64) -> anyhow::Result<Option<DietPlan>>;
    async fn save_plan(&self, owner: i64, recommendations: &str) -> anyhow::Result<DietPlan>;
}
