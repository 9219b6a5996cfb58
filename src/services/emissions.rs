// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emission calculation.
//!
//! Handles the journey workflow:
//! 1. Resolve the distance (explicit, routed, or great-circle)
//! 2. Resolve the CO₂ rate (vehicle override or transport mode table)
//! 3. Compute `co2_kg = distance_km × rate / 1000`

use geo::{Distance, Haversine, Length, Point};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::journey::{GeoPoint, JourneyRequest};
use crate::models::transport::TransportMode;
use crate::models::Vehicle;
use crate::services::maps::MapsClient;

/// Rate of the reference petrol car used for "avoided emissions".
pub const REFERENCE_CAR_RATE_G_PER_KM: f64 = 192.0;

/// Kilograms of CO₂ for a distance at a given rate.
pub fn co2_kg(distance_km: f64, rate_g_per_km: f64) -> f64 {
    distance_km * rate_g_per_km / 1000.0
}

/// A vehicle's own rate takes precedence over the mode table.
pub fn resolve_rate(mode: TransportMode, vehicle: Option<&Vehicle>) -> f64 {
    vehicle
        .map(|v| v.co2_rate_g_per_km)
        .unwrap_or_else(|| mode.co2_rate_g_per_km())
}

/// CO₂ saved relative to driving the same distance in the reference car.
pub fn avoided_co2_kg(distance_km: f64, actual_co2_kg: f64) -> f64 {
    (co2_kg(distance_km, REFERENCE_CAR_RATE_G_PER_KM) - actual_co2_kg).max(0.0)
}

/// Great-circle distance in kilometres.
pub fn great_circle_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let a = Point::new(from.longitude, from.latitude);
    let b = Point::new(to.longitude, to.latitude);
    Haversine.distance(a, b) / 1000.0
}

/// Length in kilometres of an encoded polyline (precision 5).
pub fn route_length_km(encoded: &str) -> std::result::Result<f64, String> {
    let line = polyline::decode_polyline(encoded, 5).map_err(|e| e.to_string())?;
    Ok(Haversine.length(&line) / 1000.0)
}

/// Where a journey's distance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSource {
    /// Entered by the user
    User,
    /// Google Directions route
    Directions,
    /// Straight line between the endpoints
    GreatCircle,
}

impl DistanceSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceSource::User => "user",
            DistanceSource::Directions => "directions",
            DistanceSource::GreatCircle => "great_circle",
        }
    }
}

/// Result of resolving a journey request.
#[derive(Debug, Clone, Serialize)]
pub struct EmissionEstimate {
    pub distance_km: f64,
    pub distance_source: DistanceSource,
    pub co2_rate_g_per_km: f64,
    pub co2_kg: f64,
    pub avoided_co2_kg: f64,
    #[serde(skip)]
    pub route_polyline: Option<String>,
}

/// Origin and destination coordinates of a request.
///
/// Each endpoint must carry both latitude and longitude or neither.
pub fn endpoints(req: &JourneyRequest) -> Result<Option<(GeoPoint, GeoPoint)>> {
    let origin = pair("origin", req.origin_lat, req.origin_lng)?;
    let destination = pair("destination", req.destination_lat, req.destination_lng)?;
    Ok(origin.zip(destination))
}

fn pair(name: &str, lat: Option<f64>, lng: Option<f64>) -> Result<Option<GeoPoint>> {
    match (lat, lng) {
        (Some(latitude), Some(longitude)) => Ok(Some(GeoPoint {
            latitude,
            longitude,
        })),
        (None, None) => Ok(None),
        _ => Err(AppError::BadRequest(format!(
            "{name}_lat and {name}_lng must be provided together"
        ))),
    }
}

/// Resolve distance, rate and emissions for a journey request.
pub async fn estimate(
    req: &JourneyRequest,
    vehicle: Option<&Vehicle>,
    maps: &MapsClient,
) -> Result<EmissionEstimate> {
    let points = endpoints(req)?;
    let (distance_km, distance_source, route_polyline) =
        resolve_distance(req.transport_mode, req.distance_km, points, maps).await?;

    let rate = resolve_rate(req.transport_mode, vehicle);
    let co2 = co2_kg(distance_km, rate);

    Ok(EmissionEstimate {
        distance_km,
        distance_source,
        co2_rate_g_per_km: rate,
        co2_kg: co2,
        avoided_co2_kg: avoided_co2_kg(distance_km, co2),
        route_polyline,
    })
}

async fn resolve_distance(
    mode: TransportMode,
    explicit_km: Option<f64>,
    points: Option<(GeoPoint, GeoPoint)>,
    maps: &MapsClient,
) -> Result<(f64, DistanceSource, Option<String>)> {
    if let Some(km) = explicit_km {
        return Ok((km, DistanceSource::User, None));
    }

    let Some((origin, destination)) = points else {
        return Err(AppError::BadRequest(
            "distance_km or both endpoint coordinates are required".to_string(),
        ));
    };

    if let Some(travel_mode) = mode.directions_mode() {
        if maps.is_configured() {
            match maps.directions(origin, destination, travel_mode).await {
                Ok(route) => {
                    return Ok((route.distance_km, DistanceSource::Directions, route.polyline));
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        mode = %mode,
                        "Directions lookup failed, using great-circle distance"
                    );
                }
            }
        }
    }

    Ok((
        great_circle_km(origin, destination),
        DistanceSource::GreatCircle,
        None,
    ))
}
