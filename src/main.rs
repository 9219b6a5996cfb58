// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CO₂ Tracker API Server
//!
//! Records users' vehicles and journeys in PostgreSQL and reports the CO₂
//! they emit.

use co2_tracker::{config::Config, db::PgDb, services::MapsClient, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting CO₂ Tracker API");

    // Connect to PostgreSQL
    let db = PgDb::connect(&config.database_url, config.db_max_connections).await?;
    if config.run_migrations {
        db.migrate().await?;
    } else {
        tracing::info!("Skipping migrations (RUN_MIGRATIONS=false)");
    }

    let maps = MapsClient::new(config.google_maps_api_key.clone())?;
    if !maps.is_configured() {
        tracing::warn!(
            "GOOGLE_MAPS_API_KEY not set: routing, geocoding and air quality use fallbacks"
        );
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        maps,
    });

    // Build router
    let app = co2_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("co2_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
