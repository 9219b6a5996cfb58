// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use co2_tracker::config::Config;
use co2_tracker::db::PgDb;
use co2_tracker::middleware::auth::create_jwt;
use co2_tracker::models::Role;
use co2_tracker::routes::create_router;
use co2_tracker::services::MapsClient;
use co2_tracker::AppState;
use std::sync::Arc;
use uuid::Uuid;

/// Check if a PostgreSQL database is available via environment variable.
#[allow(dead_code)]
pub fn database_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

/// Skip test with message if no database is configured.
#[macro_export]
macro_rules! require_database {
    () => {
        if !crate::common::database_available() {
            eprintln!("⚠️  Skipping: DATABASE_URL not set");
            return;
        }
    };
}

/// Connect to the test database and apply migrations.
#[allow(dead_code)]
pub async fn test_db() -> PgDb {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let db = PgDb::connect(&url, 4)
        .await
        .expect("Failed to connect to PostgreSQL");
    db.migrate().await.expect("Failed to run migrations");
    db
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> PgDb {
    PgDb::new_mock()
}

fn build_app(config: Config, db: PgDb) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        maps: MapsClient::new(config.google_maps_api_key.clone())
            .expect("Failed to build Maps client"),
        config,
        db,
    });
    (create_router(state.clone()), state)
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    build_app(Config::test_default(), test_db_offline())
}

/// Offline test app whose cookies and CORS follow `frontend_url`.
#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (axum::Router, Arc<AppState>) {
    let config = Config {
        frontend_url: frontend_url.to_string(),
        ..Config::test_default()
    };
    build_app(config, test_db_offline())
}

/// Test app backed by a real database.
#[allow(dead_code)]
pub async fn create_db_test_app() -> (axum::Router, Arc<AppState>) {
    build_app(Config::test_default(), test_db().await)
}

/// Session token signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: Uuid, role: Role) -> String {
    create_jwt(user_id, role, &Config::test_default().jwt_signing_key)
        .expect("Failed to create JWT")
}

/// Request with a Bearer token and optional JSON body.
#[allow(dead_code)]
pub fn authed_request(method: &str, uri: &str, token: &str, body: Option<&str>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Unauthenticated JSON request.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
