// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transport modes, fuel types and their CO₂ emission rates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// How a journey was travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Walking,
    Bicycle,
    ElectricScooter,
    Motorcycle,
    Car,
    ElectricCar,
    Bus,
    Tram,
    Metro,
    Train,
    Plane,
}

impl TransportMode {
    const ALL: [TransportMode; 11] = [
        TransportMode::Walking,
        TransportMode::Bicycle,
        TransportMode::ElectricScooter,
        TransportMode::Motorcycle,
        TransportMode::Car,
        TransportMode::ElectricCar,
        TransportMode::Bus,
        TransportMode::Tram,
        TransportMode::Metro,
        TransportMode::Train,
        TransportMode::Plane,
    ];

    /// Every supported mode, in display order.
    pub fn all() -> &'static [TransportMode] {
        &Self::ALL
    }

    /// Grams of CO₂ emitted per passenger-kilometre.
    pub fn co2_rate_g_per_km(self) -> f64 {
        match self {
            TransportMode::Walking | TransportMode::Bicycle => 0.0,
            TransportMode::ElectricScooter => 25.0,
            TransportMode::Motorcycle => 113.0,
            TransportMode::Car => 192.0,
            TransportMode::ElectricCar => 53.0,
            TransportMode::Bus => 104.0,
            TransportMode::Tram => 4.3,
            TransportMode::Metro => 4.4,
            TransportMode::Train => 41.0,
            TransportMode::Plane => 246.0,
        }
    }

    /// Google Directions travel mode, if the mode can be routed on the ground.
    pub fn directions_mode(self) -> Option<&'static str> {
        match self {
            TransportMode::Walking => Some("walking"),
            TransportMode::Bicycle | TransportMode::ElectricScooter => Some("bicycling"),
            TransportMode::Motorcycle | TransportMode::Car | TransportMode::ElectricCar => {
                Some("driving")
            }
            TransportMode::Bus | TransportMode::Tram | TransportMode::Metro | TransportMode::Train => {
                Some("transit")
            }
            TransportMode::Plane => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::Bicycle => "bicycle",
            TransportMode::ElectricScooter => "electric_scooter",
            TransportMode::Motorcycle => "motorcycle",
            TransportMode::Car => "car",
            TransportMode::ElectricCar => "electric_car",
            TransportMode::Bus => "bus",
            TransportMode::Tram => "tram",
            TransportMode::Metro => "metro",
            TransportMode::Train => "train",
            TransportMode::Plane => "plane",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "transport mode",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for TransportMode {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Fuel a private vehicle runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Petrol,
    Diesel,
    Hybrid,
    Electric,
    Lpg,
}

impl FuelType {
    const ALL: [FuelType; 5] = [
        FuelType::Petrol,
        FuelType::Diesel,
        FuelType::Hybrid,
        FuelType::Electric,
        FuelType::Lpg,
    ];

    /// Rate applied to a vehicle created without an explicit one.
    pub fn default_co2_rate_g_per_km(self) -> f64 {
        match self {
            FuelType::Petrol => 192.0,
            FuelType::Diesel => 171.0,
            FuelType::Hybrid => 110.0,
            FuelType::Electric => 53.0,
            FuelType::Lpg => 160.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Hybrid => "hybrid",
            FuelType::Electric => "electric",
            FuelType::Lpg => "lpg",
        }
    }
}

impl FromStr for FuelType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|fuel| fuel.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "fuel type",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for FuelType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A stored string did not match any known variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_str() {
        for mode in TransportMode::all() {
            assert_eq!(mode.as_str().parse::<TransportMode>().unwrap(), *mode);
        }
    }

    #[test]
    fn test_serde_matches_as_str() {
        let json = serde_json::to_string(&TransportMode::ElectricScooter).unwrap();
        assert_eq!(json, "\"electric_scooter\"");
    }

    #[test]
    fn test_active_modes_emit_nothing() {
        assert_eq!(TransportMode::Walking.co2_rate_g_per_km(), 0.0);
        assert_eq!(TransportMode::Bicycle.co2_rate_g_per_km(), 0.0);
        assert!(TransportMode::Plane.co2_rate_g_per_km() > TransportMode::Car.co2_rate_g_per_km());
    }

    #[test]
    fn test_plane_has_no_directions_mode() {
        assert_eq!(TransportMode::Plane.directions_mode(), None);
        assert_eq!(TransportMode::Train.directions_mode(), Some("transit"));
        assert_eq!(TransportMode::ElectricCar.directions_mode(), Some("driving"));
    }

    #[test]
    fn test_unknown_values_rejected() {
        let err = "hoverboard".parse::<TransportMode>().unwrap_err();
        assert_eq!(err.to_string(), "unknown transport mode: 'hoverboard'");
        assert!("kerosene".parse::<FuelType>().is_err());
    }

    #[test]
    fn test_fuel_default_rates() {
        assert_eq!(FuelType::Petrol.default_co2_rate_g_per_km(), 192.0);
        assert_eq!(FuelType::Electric.default_co2_rate_g_per_km(), 53.0);
    }
}
