// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Thin wrappers over Google Maps, plus the transport mode table.

use crate::error::Result;
use crate::extract::ValidQuery;
use crate::models::{GeoPoint, TransportMode};
use crate::models::validation::not_blank;
use crate::services::maps::{AirQuality, GeocodeResult};
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/air-quality", get(air_quality))
        .route("/api/geocode", get(geocode))
        .route("/api/transport-modes", get(transport_modes))
}

#[derive(Deserialize, Validate)]
struct AirQualityQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    lng: f64,
}

/// Always answers: failures degrade to the default reading.
async fn air_quality(
    State(state): State<Arc<AppState>>,
    ValidQuery(params): ValidQuery<AirQualityQuery>,
) -> Json<AirQuality> {
    let point = GeoPoint {
        latitude: params.lat,
        longitude: params.lng,
    };
    Json(state.maps.air_quality(point).await)
}

#[derive(Deserialize, Validate)]
struct GeocodeQuery {
    #[validate(length(min = 1, max = 500), custom(function = "not_blank"))]
    address: String,
}

async fn geocode(
    State(state): State<Arc<AppState>>,
    ValidQuery(params): ValidQuery<GeocodeQuery>,
) -> Result<Json<GeocodeResult>> {
    Ok(Json(state.maps.geocode(params.address.trim()).await?))
}

#[derive(Serialize)]
pub struct TransportModeInfo {
    pub mode: TransportMode,
    pub co2_rate_g_per_km: f64,
    pub directions_mode: Option<&'static str>,
}

async fn transport_modes() -> Json<Vec<TransportModeInfo>> {
    Json(
        TransportMode::all()
            .iter()
            .map(|&mode| TransportModeInfo {
                mode,
                co2_rate_g_per_km: mode.co2_rate_g_per_km(),
                directions_mode: mode.directions_mode(),
            })
            .collect(),
    )
}
