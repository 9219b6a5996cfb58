// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Journeys: record, list, estimate and export.

use crate::db::{JourneyCursor, JourneyQuery};
use crate::error::{AppError, Result};
use crate::extract::{ValidJson, ValidQuery, ValidUuid};
use crate::middleware::auth::AuthUser;
use crate::models::journey::{JourneyRequest, UpdateJourneyRequest};
use crate::models::{Journey, TransportMode, Vehicle};
use crate::services::emissions::{self, EmissionEstimate};
use crate::services::export::journeys_to_geojson;
use crate::time_utils::parse_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/journeys", get(list_journeys).post(create_journey))
        .route("/api/journeys/estimate", post(estimate_journey))
        .route("/api/journeys/export", get(export_journeys))
        .route(
            "/api/journeys/{id}",
            get(get_journey).put(update_journey).delete(delete_journey),
        )
}

fn not_found() -> AppError {
    AppError::NotFound("Journey not found".to_string())
}

// ─── Listing ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
struct JourneysQuery {
    /// Filter by transport mode
    mode: Option<TransportMode>,
    /// Filter by vehicle
    vehicle_id: Option<Uuid>,
    /// Only journeys on or after this instant (RFC3339)
    after: Option<String>,
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1))]
    per_page: u32,
}

fn default_per_page() -> u32 {
    50
}

const MAX_PER_PAGE: u32 = 100;
const CURSOR_PARTS: usize = 3;

fn parse_after_timestamp(after: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    after
        .map(|raw| {
            parse_utc_rfc3339(raw).ok_or_else(|| {
                AppError::BadRequest(
                    "Invalid 'after' parameter: must be RFC3339 datetime".to_string(),
                )
            })
        })
        .transpose()
}

fn parse_cursor(cursor: Option<&str>) -> Result<Option<JourneyCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor = || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            let parts: Vec<&str> = decoded_str.split(':').collect();
            if parts.len() != CURSOR_PARTS {
                return Err(invalid_cursor());
            }

            let seconds = parts[0].parse::<i64>().map_err(|_| invalid_cursor())?;
            let nanos = parts[1].parse::<u32>().map_err(|_| invalid_cursor())?;
            let id = parts[2].parse::<Uuid>().map_err(|_| invalid_cursor())?;
            let journey_date = DateTime::from_timestamp(seconds, nanos).ok_or_else(invalid_cursor)?;

            Ok(JourneyCursor { journey_date, id })
        })
        .transpose()
}

fn encode_cursor(cursor: JourneyCursor) -> String {
    let payload = format!(
        "{}:{}:{}",
        cursor.journey_date.timestamp(),
        cursor.journey_date.timestamp_subsec_nanos(),
        cursor.id
    );
    URL_SAFE_NO_PAD.encode(payload)
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct JourneysResponse {
    pub journeys: Vec<Journey>,
    pub per_page: u32,
    pub next_cursor: Option<String>,
}

async fn list_journeys(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidQuery(params): ValidQuery<JourneysQuery>,
) -> Result<Json<JourneysResponse>> {
    tracing::debug!(
        user_id = %user.user_id,
        mode = ?params.mode,
        after = ?params.after,
        cursor = ?params.cursor,
        "Fetching journeys"
    );

    let limit = params.per_page.min(MAX_PER_PAGE);
    let query = JourneyQuery {
        mode: params.mode,
        vehicle_id: params.vehicle_id,
        after: parse_after_timestamp(params.after.as_deref())?,
        cursor: parse_cursor(params.cursor.as_deref())?,
        // Fetch one extra item to determine if another page is available.
        limit: limit.saturating_add(1),
    };

    let mut journeys = state.db.list_journeys(user.user_id, &query).await?;

    let has_more = journeys.len() > limit as usize;
    if has_more {
        journeys.truncate(limit as usize);
    }

    let next_cursor = if has_more {
        journeys.last().map(|j| {
            encode_cursor(JourneyCursor {
                journey_date: j.journey_date,
                id: j.id,
            })
        })
    } else {
        None
    };

    Ok(Json(JourneysResponse {
        journeys,
        per_page: limit,
        next_cursor,
    }))
}

// ─── Recording ───────────────────────────────────────────────

/// Resolve the vehicle a request refers to. Another user's vehicle is
/// reported as missing.
async fn owned_vehicle(
    state: &AppState,
    user: &AuthUser,
    vehicle_id: Option<Uuid>,
) -> Result<Option<Vehicle>> {
    match vehicle_id {
        None => Ok(None),
        Some(id) => state
            .db
            .get_vehicle(user.user_id, id)
            .await?
            .map(Some)
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string())),
    }
}

/// Request metadata (must be a JSON object) with the distance source recorded.
fn journey_metadata(
    metadata: Option<serde_json::Value>,
    estimate: &EmissionEstimate,
) -> Result<serde_json::Value> {
    let mut object = match metadata {
        None | Some(serde_json::Value::Null) => serde_json::Map::new(),
        Some(serde_json::Value::Object(map)) => map,
        Some(_) => {
            return Err(AppError::BadRequest(
                "metadata must be a JSON object".to_string(),
            ))
        }
    };
    object.insert(
        "distance_source".to_string(),
        estimate.distance_source.as_str().into(),
    );
    Ok(serde_json::Value::Object(object))
}

/// Fill a journey's computed columns from a resolved request.
fn apply_request(
    journey: &mut Journey,
    req: JourneyRequest,
    estimate: EmissionEstimate,
    now: DateTime<Utc>,
) -> Result<()> {
    journey.metadata = journey_metadata(req.metadata, &estimate)?;
    journey.vehicle_id = req.vehicle_id;
    journey.transport_mode = req.transport_mode;
    journey.origin = req.origin.trim().to_string();
    journey.destination = req.destination.trim().to_string();
    journey.origin_lat = req.origin_lat;
    journey.origin_lng = req.origin_lng;
    journey.destination_lat = req.destination_lat;
    journey.destination_lng = req.destination_lng;
    journey.distance_km = estimate.distance_km;
    journey.co2_rate_g_per_km = estimate.co2_rate_g_per_km;
    journey.co2_kg = estimate.co2_kg;
    journey.route_polyline = estimate.route_polyline;
    journey.journey_date = req.journey_date.unwrap_or(now);
    journey.updated_at = now;
    Ok(())
}

async fn create_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<JourneyRequest>,
) -> Result<(StatusCode, Json<Journey>)> {
    emissions::endpoints(&req)?;
    let vehicle = owned_vehicle(&state, &user, req.vehicle_id).await?;
    let estimate = emissions::estimate(&req, vehicle.as_ref(), &state.maps).await?;

    let now = Utc::now();
    let mut journey = Journey {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        vehicle_id: None,
        transport_mode: req.transport_mode,
        origin: String::new(),
        destination: String::new(),
        origin_lat: None,
        origin_lng: None,
        destination_lat: None,
        destination_lng: None,
        distance_km: 0.0,
        co2_rate_g_per_km: 0.0,
        co2_kg: 0.0,
        route_polyline: None,
        metadata: serde_json::Value::Null,
        journey_date: now,
        created_at: now,
        updated_at: now,
    };
    apply_request(&mut journey, req, estimate, now)?;

    state.db.insert_journey(&journey).await?;

    tracing::info!(
        user_id = %user.user_id,
        journey_id = %journey.id,
        mode = %journey.transport_mode,
        distance_km = journey.distance_km,
        co2_kg = journey.co2_kg,
        "Journey recorded"
    );
    Ok((StatusCode::CREATED, Json(journey)))
}

/// Same resolution as recording, without persisting anything.
async fn estimate_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<JourneyRequest>,
) -> Result<Json<EmissionEstimate>> {
    emissions::endpoints(&req)?;
    let vehicle = owned_vehicle(&state, &user, req.vehicle_id).await?;
    let estimate = emissions::estimate(&req, vehicle.as_ref(), &state.maps).await?;
    Ok(Json(estimate))
}

async fn get_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Journey>> {
    let journey = state
        .db
        .get_journey(user.user_id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(journey))
}

/// Partial update. Distance, rate and CO₂ are recomputed only when an input
/// to them changed, so editing a label keeps the original rate snapshot.
async fn update_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
    ValidJson(req): ValidJson<UpdateJourneyRequest>,
) -> Result<Json<Journey>> {
    let mut journey = state
        .db
        .get_journey(user.user_id, id)
        .await?
        .ok_or_else(not_found)?;

    let now = Utc::now();
    if req.affects_emissions() {
        // Stored distance carried over: keep its route and recorded source.
        let distance_kept = req.keeps_distance();
        let merged = req.merge_onto(&journey);
        emissions::endpoints(&merged)?;
        let vehicle = owned_vehicle(&state, &user, merged.vehicle_id).await?;
        let estimate = emissions::estimate(&merged, vehicle.as_ref(), &state.maps).await?;
        let previous_route = journey.route_polyline.take();
        let previous_source = journey.metadata.get("distance_source").cloned();
        apply_request(&mut journey, merged, estimate, now)?;
        if distance_kept {
            journey.route_polyline = previous_route;
            if let (Some(source), Some(map)) = (previous_source, journey.metadata.as_object_mut()) {
                map.insert("distance_source".to_string(), source);
            }
        }
    } else {
        if let Some(origin) = req.origin {
            journey.origin = origin.trim().to_string();
        }
        if let Some(destination) = req.destination {
            journey.destination = destination.trim().to_string();
        }
        if let Some(date) = req.journey_date {
            journey.journey_date = date;
        }
        if let Some(metadata) = req.metadata {
            let source = journey.metadata.get("distance_source").cloned();
            journey.metadata = match metadata {
                serde_json::Value::Object(mut map) => {
                    if let Some(source) = source {
                        map.insert("distance_source".to_string(), source);
                    }
                    serde_json::Value::Object(map)
                }
                _ => {
                    return Err(AppError::BadRequest(
                        "metadata must be a JSON object".to_string(),
                    ))
                }
            };
        }
        journey.updated_at = now;
    }

    if !state.db.update_journey(&journey).await? {
        return Err(not_found());
    }
    Ok(Json(journey))
}

async fn delete_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
) -> Result<StatusCode> {
    if !state.db.delete_journey(user.user_id, id).await? {
        return Err(not_found());
    }
    tracing::info!(user_id = %user.user_id, journey_id = %id, "Journey deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// All journeys with coordinates as a GeoJSON `FeatureCollection`.
async fn export_journeys(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FeatureCollection>> {
    let journeys = state.db.list_all_journeys(user.user_id).await?;
    let collection = journeys_to_geojson(&journeys);

    tracing::debug!(
        user_id = %user.user_id,
        journeys = journeys.len(),
        features = collection.features.len(),
        "Exported journeys"
    );
    Ok(Json(collection))
}
