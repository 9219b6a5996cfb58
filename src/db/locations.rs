// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saved locations. A user has at most one default location; the partial
//! unique index `idx_user_locations_one_default` backs this up.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::activities::insert_activity;
use super::PgDb;
use crate::error::AppError;
use crate::models::{Activity, ActivityKind, UserLocation};

const LOCATION_COLUMNS: &str =
    "id, user_id, label, address, latitude, longitude, is_default, created_at, updated_at";

impl PgDb {
    pub async fn list_locations(&self, user_id: Uuid) -> Result<Vec<UserLocation>, AppError> {
        let locations = sqlx::query_as::<_, UserLocation>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM user_locations WHERE user_id = $1 \
             ORDER BY is_default DESC, label"
        ))
        .bind(user_id)
        .fetch_all(self.pool()?)
        .await?;
        Ok(locations)
    }

    pub async fn get_location(&self, user_id: Uuid, location_id: Uuid) -> Result<Option<UserLocation>, AppError> {
        let location = sqlx::query_as::<_, UserLocation>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM user_locations WHERE id = $1 AND user_id = $2"
        ))
        .bind(location_id)
        .bind(user_id)
        .fetch_optional(self.pool()?)
        .await?;
        Ok(location)
    }

    /// Insert a location, clearing any previous default first.
    pub async fn insert_location(&self, location: &UserLocation) -> Result<(), AppError> {
        let mut tx = self.begin().await?;

        if location.is_default {
            clear_default(&mut tx, location.user_id, location.id).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO user_locations (id, user_id, label, address, latitude, longitude,
                                        is_default, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(location.id)
        .bind(location.user_id)
        .bind(&location.label)
        .bind(&location.address)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(location.is_default)
        .bind(location.created_at)
        .bind(location.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_activity(
            &mut *tx,
            &Activity::new(
                location.user_id,
                ActivityKind::LocationSaved,
                format!("Saved location {}", location.label),
                serde_json::json!({ "location_id": location.id }),
            ),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Write back a location, clearing any other default when this one is default.
    pub async fn update_location(&self, location: &UserLocation) -> Result<bool, AppError> {
        let mut tx = self.begin().await?;

        if location.is_default {
            clear_default(&mut tx, location.user_id, location.id).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE user_locations
            SET label = $3, address = $4, latitude = $5, longitude = $6, is_default = $7,
                updated_at = $8
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(location.id)
        .bind(location.user_id)
        .bind(&location.label)
        .bind(&location.address)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(location.is_default)
        .bind(location.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_location(&self, user_id: Uuid, location_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_locations WHERE id = $1 AND user_id = $2")
            .bind(location_id)
            .bind(user_id)
            .execute(self.pool()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn clear_default(
    tx: &mut Transaction<'static, Postgres>,
    user_id: Uuid,
    keep_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE user_locations SET is_default = false WHERE user_id = $1 AND is_default AND id <> $2",
    )
    .bind(user_id)
    .bind(keep_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
