// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (PostgreSQL).

pub mod activities;
pub mod goals;
pub mod journeys;
pub mod locations;
pub mod messages;
pub mod postgres;
pub mod users;
pub mod vehicles;

pub use journeys::{JourneyCursor, JourneyQuery};
pub use postgres::PgDb;
pub use users::PlatformTotals;
