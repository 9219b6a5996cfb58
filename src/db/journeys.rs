// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Journey storage.
//!
//! Listing uses keyset pagination over `(journey_date DESC, id DESC)`, backed
//! by the `idx_journeys_user_date` index.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::activities::insert_activity;
use super::PgDb;
use crate::error::AppError;
use crate::models::{Activity, ActivityKind, Journey, JourneyEmission, TransportMode};

const JOURNEY_COLUMNS: &str = "id, user_id, vehicle_id, transport_mode, origin, destination, \
                               origin_lat, origin_lng, destination_lat, destination_lng, \
                               distance_km, co2_rate_g_per_km, co2_kg, route_polyline, metadata, \
                               journey_date, created_at, updated_at";

/// Position of the last journey on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JourneyCursor {
    pub journey_date: DateTime<Utc>,
    pub id: Uuid,
}

/// Filters for listing a user's journeys.
#[derive(Debug, Clone, Default)]
pub struct JourneyQuery {
    pub mode: Option<TransportMode>,
    pub vehicle_id: Option<Uuid>,
    /// Only journeys on or after this instant
    pub after: Option<DateTime<Utc>>,
    pub cursor: Option<JourneyCursor>,
    pub limit: u32,
}

impl PgDb {
    /// Insert a journey and its `journey_recorded` activity.
    pub async fn insert_journey(&self, journey: &Journey) -> Result<(), AppError> {
        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO journeys (id, user_id, vehicle_id, transport_mode, origin, destination,
                                  origin_lat, origin_lng, destination_lat, destination_lng,
                                  distance_km, co2_rate_g_per_km, co2_kg, route_polyline, metadata,
                                  journey_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(journey.id)
        .bind(journey.user_id)
        .bind(journey.vehicle_id)
        .bind(journey.transport_mode.as_str())
        .bind(&journey.origin)
        .bind(&journey.destination)
        .bind(journey.origin_lat)
        .bind(journey.origin_lng)
        .bind(journey.destination_lat)
        .bind(journey.destination_lng)
        .bind(journey.distance_km)
        .bind(journey.co2_rate_g_per_km)
        .bind(journey.co2_kg)
        .bind(&journey.route_polyline)
        .bind(&journey.metadata)
        .bind(journey.journey_date)
        .bind(journey.created_at)
        .bind(journey.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_activity(
            &mut *tx,
            &Activity::new(
                journey.user_id,
                ActivityKind::JourneyRecorded,
                format!(
                    "{} from {} to {} ({:.1} km, {:.2} kg CO₂)",
                    journey.transport_mode, journey.origin, journey.destination,
                    journey.distance_km, journey.co2_kg
                ),
                serde_json::json!({
                    "journey_id": journey.id,
                    "transport_mode": journey.transport_mode.as_str(),
                    "co2_kg": journey.co2_kg,
                }),
            ),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_journey(&self, user_id: Uuid, journey_id: Uuid) -> Result<Option<Journey>, AppError> {
        let journey = sqlx::query_as::<_, Journey>(&format!(
            "SELECT {JOURNEY_COLUMNS} FROM journeys WHERE id = $1 AND user_id = $2"
        ))
        .bind(journey_id)
        .bind(user_id)
        .fetch_optional(self.pool()?)
        .await?;
        Ok(journey)
    }

    /// One page of journeys, newest first.
    ///
    /// Callers ask for one more row than they show to detect a next page.
    pub async fn list_journeys(&self, user_id: Uuid, query: &JourneyQuery) -> Result<Vec<Journey>, AppError> {
        let journeys = sqlx::query_as::<_, Journey>(&format!(
            r#"
            SELECT {JOURNEY_COLUMNS}
            FROM journeys
            WHERE user_id = $1
              AND ($2::text IS NULL OR transport_mode = $2)
              AND ($3::uuid IS NULL OR vehicle_id = $3)
              AND ($4::timestamptz IS NULL OR journey_date >= $4)
              AND ($5::timestamptz IS NULL OR (journey_date, id) < ($5, $6::uuid))
            ORDER BY journey_date DESC, id DESC
            LIMIT $7
            "#
        ))
        .bind(user_id)
        .bind(query.mode.map(TransportMode::as_str))
        .bind(query.vehicle_id)
        .bind(query.after)
        .bind(query.cursor.map(|c| c.journey_date))
        .bind(query.cursor.map(|c| c.id))
        .bind(i64::from(query.limit))
        .fetch_all(self.pool()?)
        .await?;
        Ok(journeys)
    }

    /// All of a user's journeys, for export.
    pub async fn list_all_journeys(&self, user_id: Uuid) -> Result<Vec<Journey>, AppError> {
        let journeys = sqlx::query_as::<_, Journey>(&format!(
            "SELECT {JOURNEY_COLUMNS} FROM journeys WHERE user_id = $1 \
             ORDER BY journey_date DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool()?)
        .await?;
        Ok(journeys)
    }

    /// Write back every mutable column. Returns `false` if the row is gone.
    pub async fn update_journey(&self, journey: &Journey) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE journeys
            SET vehicle_id = $3, transport_mode = $4, origin = $5, destination = $6,
                origin_lat = $7, origin_lng = $8, destination_lat = $9, destination_lng = $10,
                distance_km = $11, co2_rate_g_per_km = $12, co2_kg = $13, route_polyline = $14,
                metadata = $15, journey_date = $16, updated_at = $17
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(journey.id)
        .bind(journey.user_id)
        .bind(journey.vehicle_id)
        .bind(journey.transport_mode.as_str())
        .bind(&journey.origin)
        .bind(&journey.destination)
        .bind(journey.origin_lat)
        .bind(journey.origin_lng)
        .bind(journey.destination_lat)
        .bind(journey.destination_lng)
        .bind(journey.distance_km)
        .bind(journey.co2_rate_g_per_km)
        .bind(journey.co2_kg)
        .bind(&journey.route_polyline)
        .bind(&journey.metadata)
        .bind(journey.journey_date)
        .bind(journey.updated_at)
        .execute(self.pool()?)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_journey(&self, user_id: Uuid, journey_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM journeys WHERE id = $1 AND user_id = $2")
            .bind(journey_id)
            .bind(user_id)
            .execute(self.pool()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Emission columns of a user's journeys, optionally within `[from, to)`.
    pub async fn journey_emissions(
        &self,
        user_id: Uuid,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<JourneyEmission>, AppError> {
        let (from, to) = range.unzip();
        let rows = sqlx::query_as::<_, JourneyEmission>(
            r#"
            SELECT id, transport_mode, distance_km, co2_kg, journey_date
            FROM journeys
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR journey_date >= $2)
              AND ($3::timestamptz IS NULL OR journey_date < $3)
            ORDER BY journey_date
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool()?)
        .await?;
        Ok(rows)
    }

    /// Distinct years with at least one journey, newest first.
    pub async fn journey_years(&self, user_id: Uuid) -> Result<Vec<i32>, AppError> {
        let years: Vec<(i32,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT EXTRACT(YEAR FROM journey_date AT TIME ZONE 'UTC')::int4 AS year
            FROM journeys
            WHERE user_id = $1
            ORDER BY year DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool()?)
        .await?;
        Ok(years.into_iter().map(|(y,)| y).collect())
    }

    /// Total CO₂ in kg emitted by a user within `[from, to)`.
    pub async fn emissions_between(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<f64, AppError> {
        let (total,): (f64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(co2_kg), 0)::float8
            FROM journeys
            WHERE user_id = $1 AND journey_date >= $2 AND journey_date < $3
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(self.pool()?)
        .await?;
        Ok(total)
    }
}
