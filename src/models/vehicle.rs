// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vehicle model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

use crate::models::transport::FuelType;
use crate::models::validation::{json_object, not_blank};

/// Vehicle row in PostgreSQL.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Vehicle {
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Display name ("Family car")
    pub name: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    /// Free-form body type (car, van, motorcycle, ...)
    pub vehicle_type: String,
    #[sqlx(try_from = "String")]
    pub fuel_type: FuelType,
    /// Grams of CO₂ per km, overrides the transport mode table
    pub co2_rate_g_per_km: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown>"))]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a vehicle.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(max = 100))]
    pub brand: Option<String>,
    #[validate(length(max = 100))]
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub vehicle_type: String,
    pub fuel_type: FuelType,
    #[validate(range(min = 0.0, max = 2000.0))]
    pub co2_rate_g_per_km: Option<f64>,
    #[validate(custom(function = "json_object"))]
    pub metadata: Option<serde_json::Value>,
}

/// Partial update for a vehicle. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub brand: Option<String>,
    #[validate(length(max = 100))]
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub vehicle_type: Option<String>,
    pub fuel_type: Option<FuelType>,
    #[validate(range(min = 0.0, max = 2000.0))]
    pub co2_rate_g_per_km: Option<f64>,
    #[validate(custom(function = "json_object"))]
    pub metadata: Option<serde_json::Value>,
}

impl Vehicle {
    /// Build a new vehicle from a validated request.
    pub fn from_request(user_id: Uuid, req: CreateVehicleRequest, now: DateTime<Utc>) -> Self {
        let co2_rate_g_per_km = req
            .co2_rate_g_per_km
            .unwrap_or_else(|| req.fuel_type.default_co2_rate_g_per_km());

        Self {
            id: Uuid::new_v4(),
            user_id,
            name: req.name.trim().to_string(),
            brand: req.brand,
            model: req.model,
            year: req.year,
            vehicle_type: req.vehicle_type.trim().to_string(),
            fuel_type: req.fuel_type,
            co2_rate_g_per_km,
            metadata: req.metadata.unwrap_or_else(|| serde_json::json!({})),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, req: UpdateVehicleRequest, now: DateTime<Utc>) {
        if let Some(name) = req.name {
            self.name = name.trim().to_string();
        }
        if req.brand.is_some() {
            self.brand = req.brand;
        }
        if req.model.is_some() {
            self.model = req.model;
        }
        if req.year.is_some() {
            self.year = req.year;
        }
        if let Some(vehicle_type) = req.vehicle_type {
            self.vehicle_type = vehicle_type.trim().to_string();
        }
        if let Some(fuel_type) = req.fuel_type {
            self.fuel_type = fuel_type;
            // A fuel change without an explicit rate resets to the fuel default.
            if req.co2_rate_g_per_km.is_none() {
                self.co2_rate_g_per_km = fuel_type.default_co2_rate_g_per_km();
            }
        }
        if let Some(rate) = req.co2_rate_g_per_km {
            self.co2_rate_g_per_km = rate;
        }
        if let Some(metadata) = req.metadata {
            self.metadata = metadata;
        }
        self.updated_at = now;
    }
}
