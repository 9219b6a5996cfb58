// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! CO₂ Tracker: record journeys and vehicles, and see what they emit
//!
//! This crate provides the backend API: accounts and sessions, vehicles,
//! journeys with emission calculation, carbon goals, saved locations,
//! the activity feed, user messages and the admin surface.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::PgDb;
use services::MapsClient;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: PgDb,
    pub maps: MapsClient,
}
