// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Journey model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

use crate::models::transport::TransportMode;
use crate::models::validation::not_blank;

/// Stored journey record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Journey {
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Vehicle used, if any (nulled when the vehicle is deleted)
    pub vehicle_id: Option<Uuid>,
    #[sqlx(try_from = "String")]
    pub transport_mode: TransportMode,
    /// Human-readable origin ("Home", "12 rue de Rivoli")
    pub origin: String,
    pub destination: String,
    pub origin_lat: Option<f64>,
    pub origin_lng: Option<f64>,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub distance_km: f64,
    /// Rate snapshot used to compute `co2_kg`
    pub co2_rate_g_per_km: f64,
    pub co2_kg: f64,
    /// Encoded route polyline (precision 5), when routed
    pub route_polyline: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown>"))]
    pub metadata: serde_json::Value,
    pub journey_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A point on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl Journey {
    /// Origin coordinates, if both components are stored.
    pub fn origin_point(&self) -> Option<GeoPoint> {
        point(self.origin_lat, self.origin_lng)
    }

    /// Destination coordinates, if both components are stored.
    pub fn destination_point(&self) -> Option<GeoPoint> {
        point(self.destination_lat, self.destination_lng)
    }
}

fn point(lat: Option<f64>, lng: Option<f64>) -> Option<GeoPoint> {
    match (lat, lng) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    }
}

/// Request body for recording (or estimating) a journey.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JourneyRequest {
    pub transport_mode: TransportMode,
    pub vehicle_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub origin: String,
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub destination: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub origin_lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub origin_lng: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub destination_lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub destination_lng: Option<f64>,
    #[validate(range(min = 0.0, max = 50000.0))]
    pub distance_km: Option<f64>,
    pub journey_date: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
}

/// Partial update for a journey. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateJourneyRequest {
    pub transport_mode: Option<TransportMode>,
    pub vehicle_id: Option<Uuid>,
    /// Detach the journey from its vehicle
    #[serde(default)]
    pub clear_vehicle: bool,
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub origin: Option<String>,
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub destination: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub origin_lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub origin_lng: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub destination_lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub destination_lng: Option<f64>,
    #[validate(range(min = 0.0, max = 50000.0))]
    pub distance_km: Option<f64>,
    pub journey_date: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
}

impl UpdateJourneyRequest {
    /// Whether any field that feeds the emission computation changed.
    pub fn affects_emissions(&self) -> bool {
        self.transport_mode.is_some()
            || self.vehicle_id.is_some()
            || self.clear_vehicle
            || self.origin_lat.is_some()
            || self.origin_lng.is_some()
            || self.destination_lat.is_some()
            || self.destination_lng.is_some()
            || self.distance_km.is_some()
    }

    fn coordinates_changed(&self) -> bool {
        self.origin_lat.is_some()
            || self.origin_lng.is_some()
            || self.destination_lat.is_some()
            || self.destination_lng.is_some()
    }

    /// Whether the stored distance survives this update: the caller neither
    /// set a distance nor moved an endpoint.
    pub fn keeps_distance(&self) -> bool {
        self.distance_km.is_none() && !self.coordinates_changed()
    }

    /// Merge this update onto an existing journey, producing a full request
    /// that can be resolved again.
    pub fn merge_onto(self, journey: &Journey) -> JourneyRequest {
        let distance_km = match self.distance_km {
            Some(d) => Some(d),
            None if self.coordinates_changed() => None,
            None => Some(journey.distance_km),
        };

        let vehicle_id = if self.clear_vehicle {
            None
        } else {
            self.vehicle_id.or(journey.vehicle_id)
        };

        JourneyRequest {
            transport_mode: self.transport_mode.unwrap_or(journey.transport_mode),
            vehicle_id,
            origin: self.origin.unwrap_or_else(|| journey.origin.clone()),
            destination: self
                .destination
                .unwrap_or_else(|| journey.destination.clone()),
            origin_lat: self.origin_lat.or(journey.origin_lat),
            origin_lng: self.origin_lng.or(journey.origin_lng),
            destination_lat: self.destination_lat.or(journey.destination_lat),
            destination_lng: self.destination_lng.or(journey.destination_lng),
            distance_km,
            journey_date: Some(self.journey_date.unwrap_or(journey.journey_date)),
            metadata: Some(self.metadata.unwrap_or_else(|| journey.metadata.clone())),
        }
    }
}

/// Columns needed to fold a journey into emission statistics.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JourneyEmission {
    pub id: Uuid,
    #[sqlx(try_from = "String")]
    pub transport_mode: TransportMode,
    pub distance_km: f64,
    pub co2_kg: f64,
    pub journey_date: DateTime<Utc>,
}

impl From<&Journey> for JourneyEmission {
    fn from(journey: &Journey) -> Self {
        Self {
            id: journey.id,
            transport_mode: journey.transport_mode,
            distance_km: journey.distance_km,
            co2_kg: journey.co2_kg,
            journey_date: journey.journey_date,
        }
    }
}
