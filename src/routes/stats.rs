// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emission statistics.

use crate::error::{AppError, Result};
use crate::extract::ValidQuery;
use crate::middleware::auth::AuthUser;
use crate::models::stats::year_bounds;
use crate::models::EmissionStats;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/stats/emissions", get(get_emission_stats))
}

#[derive(Deserialize, Validate)]
struct EmissionStatsQuery {
    /// Restrict to one calendar year
    #[validate(range(min = 1900, max = 2200))]
    year: Option<i32>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EmissionStatsResponse {
    #[serde(flatten)]
    pub stats: EmissionStats,
    pub year: Option<i32>,
    pub available_years: Vec<String>,
}

async fn get_emission_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidQuery(params): ValidQuery<EmissionStatsQuery>,
) -> Result<Json<EmissionStatsResponse>> {
    let range = params
        .year
        .map(|year| {
            year_bounds(year).ok_or_else(|| AppError::BadRequest(format!("Invalid year {}", year)))
        })
        .transpose()?;

    let journeys = state.db.journey_emissions(user.user_id, range).await?;
    let stats = EmissionStats::from_journeys(&journeys);

    let available_years = match params.year {
        // The fold only covers one year; ask the database for the rest.
        Some(_) => state
            .db
            .journey_years(user.user_id)
            .await?
            .into_iter()
            .map(|y| y.to_string())
            .collect(),
        None => stats.available_years(),
    };

    tracing::debug!(
        user_id = %user.user_id,
        year = ?params.year,
        journeys = stats.total_journeys,
        "Computed emission stats"
    );

    Ok(Json(EmissionStatsResponse {
        stats,
        year: params.year,
        available_years,
    }))
}
