// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vehicle storage. Every query is scoped to the owning user.

use uuid::Uuid;

use super::activities::insert_activity;
use super::PgDb;
use crate::error::AppError;
use crate::models::{Activity, ActivityKind, Vehicle};

const VEHICLE_COLUMNS: &str = "id, user_id, name, brand, model, year, vehicle_type, fuel_type, \
                               co2_rate_g_per_km, metadata, created_at, updated_at";

impl PgDb {
    pub async fn list_vehicles(&self, user_id: Uuid) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool()?)
        .await?;
        Ok(vehicles)
    }

    pub async fn get_vehicle(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1 AND user_id = $2"
        ))
        .bind(vehicle_id)
        .bind(user_id)
        .fetch_optional(self.pool()?)
        .await?;
        Ok(vehicle)
    }

    /// Insert a vehicle and its `vehicle_added` activity.
    pub async fn insert_vehicle(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO vehicles (id, user_id, name, brand, model, year, vehicle_type, fuel_type,
                                  co2_rate_g_per_km, metadata, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(vehicle.id)
        .bind(vehicle.user_id)
        .bind(&vehicle.name)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(&vehicle.vehicle_type)
        .bind(vehicle.fuel_type.as_str())
        .bind(vehicle.co2_rate_g_per_km)
        .bind(&vehicle.metadata)
        .bind(vehicle.created_at)
        .bind(vehicle.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_activity(
            &mut *tx,
            &Activity::new(
                vehicle.user_id,
                ActivityKind::VehicleAdded,
                format!("Added vehicle {}", vehicle.name),
                serde_json::json!({ "vehicle_id": vehicle.id, "fuel_type": vehicle.fuel_type.as_str() }),
            ),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Write back every mutable column. Returns `false` if the row is gone.
    pub async fn update_vehicle(&self, vehicle: &Vehicle) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET name = $3, brand = $4, model = $5, year = $6, vehicle_type = $7,
                fuel_type = $8, co2_rate_g_per_km = $9, metadata = $10, updated_at = $11
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(vehicle.id)
        .bind(vehicle.user_id)
        .bind(&vehicle.name)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(&vehicle.vehicle_type)
        .bind(vehicle.fuel_type.as_str())
        .bind(vehicle.co2_rate_g_per_km)
        .bind(&vehicle.metadata)
        .bind(vehicle.updated_at)
        .execute(self.pool()?)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a vehicle. Its journeys keep their rate snapshot and lose the link.
    pub async fn delete_vehicle(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1 AND user_id = $2")
            .bind(vehicle_id)
            .bind(user_id)
            .execute(self.pool()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
