// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GeoJSON export of journeys.

use geo::{Coord, LineString};
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject};

use crate::models::Journey;
use crate::time_utils::format_utc_rfc3339;

/// Line for a journey: the stored route if it decodes, otherwise the straight
/// segment between its endpoints.
pub fn journey_line(journey: &Journey) -> Option<LineString<f64>> {
    if let Some(encoded) = &journey.route_polyline {
        match polyline::decode_polyline(encoded, 5) {
            Ok(line) if line.0.len() >= 2 => return Some(line),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(journey_id = %journey.id, error = %e, "Stored route polyline is invalid");
            }
        }
    }

    let from = journey.origin_point()?;
    let to = journey.destination_point()?;
    Some(LineString::new(vec![
        Coord {
            x: from.longitude,
            y: from.latitude,
        },
        Coord {
            x: to.longitude,
            y: to.latitude,
        },
    ]))
}

/// One `LineString` feature per journey that has a line; others are skipped.
pub fn journeys_to_geojson(journeys: &[Journey]) -> FeatureCollection {
    let features = journeys
        .iter()
        .filter_map(|journey| {
            let line = journey_line(journey)?;
            Some(Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&line))),
                id: Some(Id::String(journey.id.to_string())),
                properties: Some(properties(journey)),
                foreign_members: None,
            })
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn properties(journey: &Journey) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("transport_mode".into(), journey.transport_mode.as_str().into());
    props.insert("origin".into(), journey.origin.clone().into());
    props.insert("destination".into(), journey.destination.clone().into());
    props.insert("distance_km".into(), journey.distance_km.into());
    props.insert("co2_kg".into(), journey.co2_kg.into());
    props.insert(
        "journey_date".into(),
        format_utc_rfc3339(journey.journey_date).into(),
    );
    props
}
