// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Carbon goal storage.

use uuid::Uuid;

use super::activities::insert_activity;
use super::PgDb;
use crate::error::AppError;
use crate::models::{Activity, ActivityKind, CarbonGoal};

const GOAL_COLUMNS: &str =
    "id, user_id, title, target_co2_kg, period_start, period_end, created_at, updated_at";

impl PgDb {
    pub async fn list_goals(&self, user_id: Uuid) -> Result<Vec<CarbonGoal>, AppError> {
        let goals = sqlx::query_as::<_, CarbonGoal>(&format!(
            "SELECT {GOAL_COLUMNS} FROM carbon_goals WHERE user_id = $1 \
             ORDER BY period_start DESC, created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool()?)
        .await?;
        Ok(goals)
    }

    pub async fn get_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<Option<CarbonGoal>, AppError> {
        let goal = sqlx::query_as::<_, CarbonGoal>(&format!(
            "SELECT {GOAL_COLUMNS} FROM carbon_goals WHERE id = $1 AND user_id = $2"
        ))
        .bind(goal_id)
        .bind(user_id)
        .fetch_optional(self.pool()?)
        .await?;
        Ok(goal)
    }

    /// Insert a goal and its `goal_created` activity.
    pub async fn insert_goal(&self, goal: &CarbonGoal) -> Result<(), AppError> {
        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO carbon_goals (id, user_id, title, target_co2_kg, period_start, period_end,
                                      created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(goal.id)
        .bind(goal.user_id)
        .bind(&goal.title)
        .bind(goal.target_co2_kg)
        .bind(goal.period_start)
        .bind(goal.period_end)
        .bind(goal.created_at)
        .bind(goal.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_activity(
            &mut *tx,
            &Activity::new(
                goal.user_id,
                ActivityKind::GoalCreated,
                format!("Set goal \"{}\" ({:.0} kg CO₂)", goal.title, goal.target_co2_kg),
                serde_json::json!({ "goal_id": goal.id }),
            ),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn update_goal(&self, goal: &CarbonGoal) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE carbon_goals
            SET title = $3, target_co2_kg = $4, period_start = $5, period_end = $6, updated_at = $7
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(goal.id)
        .bind(goal.user_id)
        .bind(&goal.title)
        .bind(goal.target_co2_kg)
        .bind(goal.period_start)
        .bind(goal.period_end)
        .bind(goal.updated_at)
        .execute(self.pool()?)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM carbon_goals WHERE id = $1 AND user_id = $2")
            .bind(goal_id)
            .bind(user_id)
            .execute(self.pool()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
