// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod goal;
pub mod journey;
pub mod location;
pub mod message;
pub mod stats;
pub mod transport;
pub mod user;
pub mod validation;
pub mod vehicle;

pub use activity::{Activity, ActivityKind};
pub use goal::CarbonGoal;
pub use journey::{GeoPoint, Journey, JourneyEmission};
pub use location::UserLocation;
pub use message::{Message, MessageWithSender};
pub use stats::{EmissionStats, GoalProgress};
pub use transport::{FuelType, TransportMode};
pub use user::{Role, User, UserResponse};
pub use vehicle::Vehicle;
