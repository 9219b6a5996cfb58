// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Carbon goals and their progress.

use crate::error::{AppError, Result};
use crate::extract::{ValidJson, ValidUuid};
use crate::middleware::auth::AuthUser;
use crate::models::goal::{CreateGoalRequest, UpdateGoalRequest};
use crate::models::stats::date_range_bounds;
use crate::models::{CarbonGoal, GoalProgress};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/goals", get(list_goals).post(create_goal))
        .route(
            "/api/goals/{id}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
        .route("/api/goals/{id}/progress", get(goal_progress))
}

fn not_found() -> AppError {
    AppError::NotFound("Goal not found".to_string())
}

async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<CarbonGoal>>> {
    Ok(Json(state.db.list_goals(user.user_id).await?))
}

async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<CreateGoalRequest>,
) -> Result<(StatusCode, Json<CarbonGoal>)> {
    let goal = CarbonGoal::from_request(user.user_id, req, Utc::now());
    state.db.insert_goal(&goal).await?;
    tracing::info!(user_id = %user.user_id, goal_id = %goal.id, "Goal created");
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn get_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<CarbonGoal>> {
    let goal = state.db.get_goal(user.user_id, id).await?.ok_or_else(not_found)?;
    Ok(Json(goal))
}

async fn update_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
    ValidJson(req): ValidJson<UpdateGoalRequest>,
) -> Result<Json<CarbonGoal>> {
    let mut goal = state.db.get_goal(user.user_id, id).await?.ok_or_else(not_found)?;

    goal.apply(req, Utc::now()).map_err(|e| {
        AppError::BadRequest(
            e.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string()),
        )
    })?;

    if !state.db.update_goal(&goal).await? {
        return Err(not_found());
    }
    Ok(Json(goal))
}

async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
) -> Result<StatusCode> {
    if !state.db.delete_goal(user.user_id, id).await? {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// CO₂ emitted by journeys within the goal's period against its budget.
async fn goal_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<GoalProgress>> {
    let goal = state.db.get_goal(user.user_id, id).await?.ok_or_else(not_found)?;

    let (from, to) = date_range_bounds(goal.period_start, goal.period_end);
    let emitted = state.db.emissions_between(user.user_id, from, to).await?;
    let progress = GoalProgress::compute(goal.id, goal.target_co2_kg, emitted);

    tracing::debug!(
        user_id = %user.user_id,
        goal_id = %goal.id,
        emitted_co2_kg = emitted,
        status = ?progress.status,
        "Computed goal progress"
    );
    Ok(Json(progress))
}
