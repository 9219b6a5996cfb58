// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Maps Platform client.
//!
//! Handles:
//! - Geocoding addresses (cached per normalized address)
//! - Directions route length for ground transport modes
//! - Current air quality, falling back to a default reading on any failure

use crate::models::journey::GeoPoint;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
const AIR_QUALITY_URL: &str = "https://airquality.googleapis.com/v1/currentConditions:lookup";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Base URLs of the Maps APIs used.
#[derive(Debug, Clone)]
struct Endpoints {
    geocode: String,
    directions: String,
    air_quality: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocode: GEOCODE_URL.to_string(),
            directions: DIRECTIONS_URL.to_string(),
            air_quality: AIR_QUALITY_URL.to_string(),
        }
    }
}

/// Google Maps API client.
#[derive(Clone)]
pub struct MapsClient {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoints: Arc<Endpoints>,
    geocode_cache: Arc<DashMap<String, GeocodeResult>>,
}

impl MapsClient {
    /// Create a client. Without a key every lookup reports `NotConfigured`.
    pub fn new(api_key: Option<String>) -> Result<Self, MapsError> {
        Self::with_endpoints(api_key, Endpoints::default(), DEFAULT_HTTP_TIMEOUT)
    }

    fn with_endpoints(
        api_key: Option<String>,
        endpoints: Endpoints,
        timeout: Duration,
    ) -> Result<Self, MapsError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MapsError::Request(format!("failed building HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            endpoints: Arc::new(endpoints),
            geocode_cache: Arc::new(DashMap::new()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn key(&self) -> Result<&str, MapsError> {
        self.api_key.as_deref().ok_or(MapsError::NotConfigured)
    }

    /// Geocode a free-form address.
    pub async fn geocode(&self, address: &str) -> Result<GeocodeResult, MapsError> {
        let cache_key = normalize_address(address);
        if let Some(hit) = self.geocode_cache.get(&cache_key) {
            tracing::debug!(address = %cache_key, "Geocode cache hit");
            return Ok(hit.clone());
        }

        let key = self.key()?;
        let response = self
            .http
            .get(&self.endpoints.geocode)
            .query(&[("address", address), ("key", key)])
            .send()
            .await
            .map_err(|e| MapsError::Request(e.to_string()))?;

        let body: GeocodeResponse = check_response_json(response).await?;
        let result = parse_geocode(address, body)?;

        self.geocode_cache.insert(cache_key, result.clone());
        Ok(result)
    }

    /// Route between two points with a Directions travel mode
    /// (`driving`, `walking`, `bicycling`, `transit`).
    pub async fn directions(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        travel_mode: &str,
    ) -> Result<Route, MapsError> {
        let key = self.key()?;
        let response = self
            .http
            .get(&self.endpoints.directions)
            .query(&[
                ("origin", format_point(origin)),
                ("destination", format_point(destination)),
                ("mode", travel_mode.to_string()),
                ("key", key.to_string()),
            ])
            .send()
            .await
            .map_err(|e| MapsError::Request(e.to_string()))?;

        let body: DirectionsResponse = check_response_json(response).await?;
        let route = parse_directions(body)?;

        tracing::debug!(
            travel_mode,
            distance_km = route.distance_km,
            duration_secs = route.duration_secs,
            "Directions route resolved"
        );
        Ok(route)
    }

    /// Current air quality at a point. Never fails: any error yields the
    /// default reading.
    pub async fn air_quality(&self, point: GeoPoint) -> AirQuality {
        match self.fetch_air_quality(point).await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    latitude = point.latitude,
                    longitude = point.longitude,
                    "Air quality lookup failed, returning default reading"
                );
                AirQuality::fallback()
            }
        }
    }

    async fn fetch_air_quality(&self, point: GeoPoint) -> Result<AirQuality, MapsError> {
        let key = self.key()?;
        let body = serde_json::json!({
            "location": {
                "latitude": point.latitude,
                "longitude": point.longitude,
            }
        });

        let response = self
            .http
            .post(&self.endpoints.air_quality)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| MapsError::Request(e.to_string()))?;

        let body: AirQualityResponse = check_response_json(response).await?;
        parse_air_quality(body)
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, MapsError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MapsError::Status {
            status: format!("HTTP {}", status.as_u16()),
            message: body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| MapsError::InvalidResponse(format!("JSON parse error: {}", e)))
}

fn format_point(point: GeoPoint) -> String {
    format!("{:.6},{:.6}", point.latitude, point.longitude)
}

/// Lowercase and collapse whitespace so equivalent addresses share a cache slot.
fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Google status strings that are not "OK".
fn status_error(status: &str, message: Option<String>, query: &str) -> MapsError {
    match status {
        "ZERO_RESULTS" | "NOT_FOUND" => MapsError::NoResults(query.to_string()),
        other => MapsError::Status {
            status: other.to_string(),
            message: message.unwrap_or_default(),
        },
    }
}

// ─── Geocoding ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeCandidate>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeCandidate {
    formatted_address: String,
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Best geocoding match for an address.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
}

impl GeocodeResult {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

pub fn parse_geocode(query: &str, body: GeocodeResponse) -> Result<GeocodeResult, MapsError> {
    if body.status != "OK" {
        return Err(status_error(&body.status, body.error_message, query));
    }

    let best = body
        .results
        .into_iter()
        .next()
        .ok_or_else(|| MapsError::NoResults(query.to_string()))?;

    Ok(GeocodeResult {
        latitude: best.geometry.location.lat,
        longitude: best.geometry.location.lng,
        formatted_address: best.formatted_address,
    })
}

// ─── Directions ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
    overview_polyline: Option<EncodedPolyline>,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    distance: TextValue,
    duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

/// First route returned by Directions.
#[derive(Debug, Clone)]
pub struct Route {
    pub distance_km: f64,
    pub duration_secs: f64,
    pub polyline: Option<String>,
}

pub fn parse_directions(body: DirectionsResponse) -> Result<Route, MapsError> {
    if body.status != "OK" {
        return Err(status_error(&body.status, body.error_message, "route"));
    }

    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| MapsError::NoResults("route".to_string()))?;

    let meters: f64 = route.legs.iter().map(|leg| leg.distance.value).sum();
    let duration_secs: f64 = route
        .legs
        .iter()
        .filter_map(|leg| leg.duration.as_ref().map(|d| d.value))
        .sum();
    let polyline = route.overview_polyline.map(|p| p.points);

    // Legs without distances still let us measure the drawn route.
    let distance_km = if meters > 0.0 {
        meters / 1000.0
    } else if let Some(encoded) = polyline.as_deref() {
        crate::services::emissions::route_length_km(encoded)
            .map_err(MapsError::InvalidResponse)?
    } else {
        return Err(MapsError::InvalidResponse(
            "route has neither leg distances nor a polyline".to_string(),
        ));
    };

    Ok(Route {
        distance_km,
        duration_secs,
        polyline,
    })
}

// ─── Air Quality ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityResponse {
    #[serde(default)]
    indexes: Vec<AirQualityIndex>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AirQualityIndex {
    code: String,
    aqi: u32,
    category: String,
    dominant_pollutant: Option<String>,
}

/// Air quality reading returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AirQuality {
    pub aqi: u32,
    pub category: String,
    pub dominant_pollutant: String,
    /// "google" or "fallback"
    pub source: String,
}

impl AirQuality {
    /// Reading returned when the real lookup is unavailable.
    pub fn fallback() -> Self {
        Self {
            aqi: 50,
            category: "Good air quality".to_string(),
            dominant_pollutant: "pm25".to_string(),
            source: "fallback".to_string(),
        }
    }
}

/// Prefer the Universal AQI, otherwise take the first index reported.
pub fn parse_air_quality(body: AirQualityResponse) -> Result<AirQuality, MapsError> {
    let mut indexes = body.indexes;
    let position = indexes
        .iter()
        .position(|i| i.code == "uaqi")
        .unwrap_or(0);

    if indexes.is_empty() {
        return Err(MapsError::InvalidResponse(
            "air quality response has no indexes".to_string(),
        ));
    }

    let index = indexes.swap_remove(position);
    Ok(AirQuality {
        aqi: index.aqi,
        category: index.category,
        dominant_pollutant: index.dominant_pollutant.unwrap_or_default(),
        source: "google".to_string(),
    })
}

/// Errors from Google Maps lookups.
#[derive(Debug, thiserror::Error)]
pub enum MapsError {
    #[error("Google Maps API key not configured")]
    NotConfigured,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Google Maps returned {status}: {message}")]
    Status { status: String, message: String },

    #[error("No results for '{0}'")]
    NoResults(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Client whose every endpoint is a local socket that accepts connections
/// and never answers.
#[cfg(test)]
pub(crate) async fn unresponsive_client(timeout: Duration) -> MapsClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let endpoints = Endpoints {
        geocode: format!("{base}/geocode"),
        directions: format!("{base}/directions"),
        air_quality: format!("{base}/air-quality"),
    };
    MapsClient::with_endpoints(Some("test-key".to_string()), endpoints, timeout).unwrap()
}
