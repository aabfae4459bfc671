use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use time::{Date, OffsetDateTime};

use super::FoodStore;
use crate::{
    analysis::repo_types::{FoodAnalysis, NutrientEstimate},
    diet_plan::repo_types::DietPlan,
    food_logs::repo_types::{FoodLog, NewFoodLog},
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    logs: Vec<FoodLog>,
    analyses: Vec<FoodAnalysis>,
    plans: Vec<DietPlan>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process [`FoodStore`] for unit tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }

    pub fn analysis_count(&self) -> usize {
        self.tables().analyses.len()
    }

    pub fn plan_count(&self) -> usize {
        self.tables().plans.len()
    }
}

#[async_trait]
impl FoodStore for MemoryStore {
    async fn create_log(&self, owner: i64, log: &NewFoodLog) -> anyhow::Result<FoodLog> {
        let mut t = self.tables();
        let row = FoodLog {
            id: t.next_id(),
            user_id: owner,
            date: log.date,
            meal_time: log.meal_time,
            time: log.time.clone(),
            food_description: log.food_description.clone(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };
        t.logs.push(row.clone());
        Ok(row)
    }

    async fn get_log(&self, owner: i64, id: i64) -> anyhow::Result<Option<FoodLog>> {
        Ok(self
            .tables()
            .logs
            .iter()
            .find(|l| l.id == id && l.user_id == owner)
            .cloned())
    }

    async fn list_logs(&self, owner: i64, date: Option<Date>) -> anyhow::Result<Vec<FoodLog>> {
        let mut rows: Vec<FoodLog> = self
            .tables()
            .logs
            .iter()
            .filter(|l| l.user_id == owner && date.map_or(true, |d| l.date == d))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(a.meal_time.cmp(&b.meal_time))
                .then(a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    async fn list_logs_between(
        &self,
        owner: i64,
        start: Date,
        end: Date,
    ) -> anyhow::Result<Vec<FoodLog>> {
        let mut rows: Vec<FoodLog> = self
            .tables()
            .logs
            .iter()
            .filter(|l| l.user_id == owner && l.date >= start && l.date <= end)
            .cloned()
            .collect();
        rows.sort_by_key(|l| (l.date, l.meal_time, l.id));
        Ok(rows)
    }

    async fn update_log(
        &self,
        owner: i64,
        id: i64,
        log: &NewFoodLog,
    ) -> anyhow::Result<Option<FoodLog>> {
        let mut t = self.tables();
        let Some(row) = t
            .logs
            .iter_mut()
            .find(|l| l.id == id && l.user_id == owner)
        else {
            return Ok(None);
        };
        row.date = log.date;
        row.meal_time = log.meal_time;
        row.time = log.time.clone();
        row.food_description = log.food_description.clone();
        row.updated_at = Some(OffsetDateTime::now_utc());
        Ok(Some(row.clone()))
    }

    async fn delete_log(&self, owner: i64, id: i64) -> anyhow::Result<bool> {
        let mut t = self.tables();
        let before = t.logs.len();
        t.logs.retain(|l| !(l.id == id && l.user_id == owner));
        if t.logs.len() == before {
            return Ok(false);
        }
        t.analyses.retain(|a| a.food_log_id != id);
        Ok(true)
    }

    async fn get_analysis(&self, food_log_id: i64) -> anyhow::Result<Option<FoodAnalysis>> {
        Ok(self
            .tables()
            .analyses
            .iter()
            .find(|a| a.food_log_id == food_log_id)
            .cloned())
    }

    async fn analyses_for(
        &self,
        food_log_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, FoodAnalysis>> {
        Ok(self
            .tables()
            .analyses
            .iter()
            .filter(|a| food_log_ids.contains(&a.food_log_id))
            .map(|a| (a.food_log_id, a.clone()))
            .collect())
    }

    async fn insert_analysis(
        &self,
        food_log_id: i64,
        estimate: &NutrientEstimate,
    ) -> anyhow::Result<FoodAnalysis> {
        let mut t = self.tables();
        if let Some(existing) = t.analyses.iter().find(|a| a.food_log_id == food_log_id) {
            return Ok(existing.clone());
        }
        let row = FoodAnalysis {
            id: t.next_id(),
            food_log_id,
            calories: estimate.calories,
            protein: estimate.protein,
            carbs: estimate.carbs,
            fats: estimate.fats,
            fiber: estimate.fiber,
            summary: estimate.summary.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.analyses.push(row.clone());
        Ok(row)
    }

    async fn latest_plan(&self, owner: i64) -> anyhow::Result<Option<DietPlan>> {
        Ok(self
            .tables()
            .plans
            .iter()
            .filter(|p| p.user_id == owner)
            .max_by_key(|p| (p.created_at, p.id))
            .cloned())
    }

    async fn save_plan(&self, owner: i64, recommendations: &str) -> anyhow::Result<DietPlan> {
        let mut t = self.tables();
        if let Some(plan) = t
            .plans
            .iter_mut()
            .filter(|p| p.user_id == owner)
            .max_by_key(|p| (p.created_at, p.id))
        {
            plan.recommendations = recommendations.to_string();
            plan.updated_at = Some(OffsetDateTime::now_utc());
            return Ok(plan.clone());
        }
        let plan = DietPlan {
            id: t.next_id(),
            user_id: owner,
            recommendations: recommendations.to_string(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };
        t.plans.push(plan.clone());
        Ok(plan)
    }
}
