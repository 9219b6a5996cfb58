// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vehicle CRUD.

use crate::error::{AppError, Result};
use crate::extract::{ValidJson, ValidUuid};
use crate::middleware::auth::AuthUser;
use crate::models::vehicle::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::models::Vehicle;
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
        .route("/api/vehicles", get(list_vehicles).post(create_vehicle))
        .route(
            "/api/vehicles/{id}",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

fn not_found() -> AppError {
    AppError::NotFound("Vehicle not found".to_string())
}

async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Vehicle>>> {
    Ok(Json(state.db.list_vehicles(user.user_id).await?))
}

async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<Vehicle>)> {
    let vehicle = Vehicle::from_request(user.user_id, req, Utc::now());
    state.db.insert_vehicle(&vehicle).await?;

    tracing::info!(
        user_id = %user.user_id,
        vehicle_id = %vehicle.id,
        fuel_type = vehicle.fuel_type.as_str(),
        co2_rate_g_per_km = vehicle.co2_rate_g_per_km,
        "Vehicle added"
    );
    Ok((StatusCode::CREATED, Json(vehicle)))
}

async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Vehicle>> {
    let vehicle = state
        .db
        .get_vehicle(user.user_id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(vehicle))
}

/// Existing journeys keep the rate they were computed with.
async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
    ValidJson(req): ValidJson<UpdateVehicleRequest>,
) -> Result<Json<Vehicle>> {
    let mut vehicle = state
        .db
        .get_vehicle(user.user_id, id)
        .await?
        .ok_or_else(not_found)?;

    vehicle.apply(req, Utc::now());
    if !state.db.update_vehicle(&vehicle).await? {
        return Err(not_found());
    }
    Ok(Json(vehicle))
}

async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
) -> Result<StatusCode> {
    if !state.db.delete_vehicle(user.user_id, id).await? {
        return Err(not_found());
    }
    tracing::info!(user_id = %user.user_id, vehicle_id = %id, "Vehicle deleted");
    Ok(StatusCode::NO_CONTENT)
}
