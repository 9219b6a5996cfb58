// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod emissions;
pub mod export;
pub mod maps;
pub mod password;

pub use emissions::{DistanceSource, EmissionEstimate};
pub use maps::{MapsClient, MapsError};
