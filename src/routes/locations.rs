// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saved locations.

use crate::error::{AppError, Result};
use crate::extract::{ValidJson, ValidUuid};
use crate::middleware::auth::AuthUser;
use crate::models::location::{CreateLocationRequest, UpdateLocationRequest};
use crate::models::{GeoPoint, UserLocation};
use crate::services::MapsClient;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/locations", get(list_locations).post(create_location))
        .route(
            "/api/locations/{id}",
            get(get_location).put(update_location).delete(delete_location),
        )
}

fn not_found() -> AppError {
    AppError::NotFound("Location not found".to_string())
}

/// Coordinates from the request, or from geocoding `address` when absent.
async fn resolve_point(
    maps: &MapsClient,
    latitude: Option<f64>,
    longitude: Option<f64>,
    address: Option<&str>,
) -> Result<GeoPoint> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(GeoPoint {
            latitude,
            longitude,
        }),
        (None, None) => {
            let address = address.ok_or_else(|| {
                AppError::BadRequest("latitude/longitude or address is required".to_string())
            })?;
            if !maps.is_configured() {
                return Err(AppError::BadRequest(
                    "Geocoding unavailable: provide latitude and longitude".to_string(),
                ));
            }
            let result = maps.geocode(address).await.map_err(|e| match e {
                // No match cannot be saved as a location
                crate::services::MapsError::NoResults(q) => {
                    AppError::ExternalApi(format!("Could not geocode '{}'", q))
                }
                other => AppError::from(other),
            })?;
            Ok(result.point())
        }
        _ => Err(AppError::BadRequest(
            "latitude and longitude must be provided together".to_string(),
        )),
    }
}

async fn list_locations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<UserLocation>>> {
    Ok(Json(state.db.list_locations(user.user_id).await?))
}

async fn create_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<CreateLocationRequest>,
) -> Result<(StatusCode, Json<UserLocation>)> {
    let point = resolve_point(&state.maps, req.latitude, req.longitude, req.address.as_deref()).await?;

    let now = Utc::now();
    let location = UserLocation {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        label: req.label.trim().to_string(),
        address: req.address,
        latitude: point.latitude,
        longitude: point.longitude,
        is_default: req.is_default,
        created_at: now,
        updated_at: now,
    };
    state.db.insert_location(&location).await?;

    tracing::info!(
        user_id = %user.user_id,
        location_id = %location.id,
        is_default = location.is_default,
        "Location saved"
    );
    Ok((StatusCode::CREATED, Json(location)))
}

async fn get_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<UserLocation>> {
    let location = state
        .db
        .get_location(user.user_id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(location))
}

/// Fill in coordinates for an update that changes the address only. A new
/// address must resolve, so it never keeps the old point.
async fn locate_update(maps: &MapsClient, req: &mut UpdateLocationRequest) -> Result<()> {
    if req.latitude.is_none() && req.longitude.is_none() {
        if let Some(address) = req.address.as_deref() {
            let point = resolve_point(maps, None, None, Some(address)).await?;
            req.latitude = Some(point.latitude);
            req.longitude = Some(point.longitude);
        }
        return Ok(());
    }
    resolve_point(maps, req.latitude, req.longitude, None).await?;
    Ok(())
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
    ValidJson(mut req): ValidJson<UpdateLocationRequest>,
) -> Result<Json<UserLocation>> {
    locate_update(&state.maps, &mut req).await?;

    let mut location = state
        .db
        .get_location(user.user_id, id)
        .await?
        .ok_or_else(not_found)?;

    location.apply(req, Utc::now());
    if !state.db.update_location(&location).await? {
        return Err(not_found());
    }
    Ok(Json(location))
}

async fn delete_location(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
) -> Result<StatusCode> {
    if !state.db.delete_location(user.user_id, id).await? {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
