// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity feed.

use crate::error::Result;
use crate::extract::ValidQuery;
use crate::middleware::auth::AuthUser;
use crate::models::Activity;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/activities", get(get_activities))
}

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

#[derive(Deserialize, Validate)]
struct ActivitiesQuery {
    #[validate(range(min = 1))]
    limit: Option<u32>,
}

#[derive(Serialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<Activity>,
    pub limit: u32,
}

async fn get_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidQuery(params): ValidQuery<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let activities = state
        .db
        .list_activities(user.user_id, i64::from(limit))
        .await?;

    Ok(Json(ActivitiesResponse { activities, limit }))
}
