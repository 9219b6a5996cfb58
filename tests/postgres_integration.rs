// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end tests against a real PostgreSQL database.
//!
//! Skipped unless `DATABASE_URL` is set. Each test registers fresh users with
//! random emails so runs do not interfere with each other.

use axum::http::{header, StatusCode};
use axum::Router;
use co2_tracker::db::users::AdminBootstrap;
use co2_tracker::services::password::hash_password;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

mod common;

/// Register a new account; returns (user id, token).
async fn register(app: &Router) -> (Uuid, String) {
    let email = format!("user-{}@example.com", Uuid::new_v4());
    let body = json!({"email": email, "password": "secret123", "name": "Test User"}).to_string();

    let response = app
        .clone()
        .oneshot(common::json_request("POST", "/auth/register", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key(header::SET_COOKIE));

    let body = common::body_json(response).await;
    let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
    (id, body["token"].as_str().unwrap().to_string())
}

async fn call(app: &Router, method: &str, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = body.map(|b| b.to_string());
    let response = app
        .clone()
        .oneshot(common::authed_request(method, uri, token, body.as_deref()))
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_register_login_and_duplicate_email() {
    require_database!();
    let (app, _) = common::create_db_test_app().await;

    let email = format!("Mixed-{}@Example.com", Uuid::new_v4());
    let body = json!({"email": email, "password": "secret123", "name": "Alice"}).to_string();

    let response = app
        .clone()
        .oneshot(common::json_request("POST", "/auth/register", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = common::body_json(response).await;
    assert_eq!(created["user"]["email"], email.to_lowercase());
    assert_eq!(created["user"]["role"], "user");

    let response = app
        .clone()
        .oneshot(common::json_request("POST", "/auth/register", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let login = json!({"email": email.to_uppercase(), "password": "secret123"}).to_string();
    let response = app
        .clone()
        .oneshot(common::json_request("POST", "/auth/login", &login))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let wrong = json!({"email": email, "password": "wrongpass1"}).to_string();
    let response = app
        .clone()
        .oneshot(common::json_request("POST", "/auth/login", &wrong))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "invalid_credentials");

    // Unknown email looks the same as a wrong password
    let unknown = json!({"email": format!("nobody-{}@example.com", Uuid::new_v4()), "password": "secret123"})
        .to_string();
    let response = app
        .clone()
        .oneshot(common::json_request("POST", "/auth/login", &unknown))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_journey_lifecycle_and_stats() {
    require_database!();
    let (app, _) = common::create_db_test_app().await;
    let (_, token) = register(&app).await;

    let (status, vehicle) = call(
        &app,
        "POST",
        "/api/vehicles",
        &token,
        Some(json!({"name": "Clio", "vehicle_type": "car", "fuel_type": "diesel", "co2_rate_g_per_km": 100.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let vehicle_id = vehicle["id"].as_str().unwrap().to_string();

    let (status, journey) = call(
        &app,
        "POST",
        "/api/journeys",
        &token,
        Some(json!({
            "transport_mode": "car",
            "vehicle_id": vehicle_id,
            "origin": "Home",
            "destination": "Office",
            "distance_km": 20.0,
            "journey_date": "2025-03-10T08:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(journey["co2_kg"], 2.0);
    assert_eq!(journey["metadata"]["distance_source"], "user");
    let journey_id = journey["id"].as_str().unwrap().to_string();

    // Renaming keeps the stored emissions
    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/api/journeys/{journey_id}"),
        &token,
        Some(json!({"destination": "New office"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["destination"], "New office");
    assert_eq!(updated["co2_kg"], 2.0);

    // Changing the distance recomputes them
    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/api/journeys/{journey_id}"),
        &token,
        Some(json!({"distance_km": 30.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["co2_kg"], 3.0);

    let (status, stats) = call(&app, "GET", "/api/stats/emissions?year=2025", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_journeys"], 1);
    assert_eq!(stats["total_co2_kg"], 3.0);
    assert_eq!(stats["year"], 2025);

    let (status, _) = call(&app, "DELETE", &format!("/api/journeys/{journey_id}"), &token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, "GET", &format!("/api/journeys/{journey_id}"), &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, activities) = call(&app, "GET", "/api/activities", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = activities["activities"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["activity_type"].as_str())
        .collect();
    assert!(kinds.contains(&"account_created"));
    assert!(kinds.contains(&"vehicle_added"));
    assert!(kinds.contains(&"journey_recorded"));
}

#[tokio::test]
async fn test_journey_pagination() {
    require_database!();
    let (app, _) = common::create_db_test_app().await;
    let (_, token) = register(&app).await;

    for day in 1..=5 {
        let (status, _) = call(
            &app,
            "POST",
            "/api/journeys",
            &token,
            Some(json!({
                "transport_mode": "bus",
                "origin": "A",
                "destination": "B",
                "distance_km": 10.0,
                "journey_date": format!("2025-01-0{day}T12:00:00Z")
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = call(&app, "GET", "/api/journeys?per_page=2", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["journeys"].as_array().unwrap().len(), 2);
    assert_eq!(page["journeys"][0]["journey_date"], "2025-01-05T12:00:00Z");

    let mut seen = 2;
    let mut cursor = page["next_cursor"].as_str().unwrap().to_string();
    loop {
        let (status, page) = call(
            &app,
            "GET",
            &format!("/api/journeys?per_page=2&cursor={cursor}"),
            &token,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        seen += page["journeys"].as_array().unwrap().len();
        match page["next_cursor"].as_str() {
            Some(next) => cursor = next.to_string(),
            None => break,
        }
    }
    assert_eq!(seen, 5);
}

#[tokio::test]
async fn test_rows_are_private_to_owner() {
    require_database!();
    let (app, _) = common::create_db_test_app().await;
    let (_, alice) = register(&app).await;
    let (_, bob) = register(&app).await;

    let (_, vehicle) = call(
        &app,
        "POST",
        "/api/vehicles",
        &alice,
        Some(json!({"name": "Bike", "vehicle_type": "bike", "fuel_type": "electric"})),
    )
    .await;
    let vehicle_id = vehicle["id"].as_str().unwrap();

    let (status, _) = call(&app, "GET", &format!("/api/vehicles/{vehicle_id}"), &bob, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Another user's vehicle cannot be attached to a journey
    let (status, _) = call(
        &app,
        "POST",
        "/api/journeys",
        &bob,
        Some(json!({
            "transport_mode": "car",
            "vehicle_id": vehicle_id,
            "origin": "A",
            "destination": "B",
            "distance_km": 1.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_single_default_location() {
    require_database!();
    let (app, _) = common::create_db_test_app().await;
    let (_, token) = register(&app).await;

    for label in ["Home", "Work"] {
        let (status, _) = call(
            &app,
            "POST",
            "/api/locations",
            &token,
            Some(json!({"label": label, "latitude": 48.85, "longitude": 2.35, "is_default": true})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, locations) = call(&app, "GET", "/api/locations", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    let defaults: Vec<&Value> = locations
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| l["is_default"] == true)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0]["label"], "Work");
}

#[tokio::test]
async fn test_goal_progress() {
    require_database!();
    let (app, _) = common::create_db_test_app().await;
    let (_, token) = register(&app).await;

    let (_, goal) = call(
        &app,
        "POST",
        "/api/goals",
        &token,
        Some(json!({"title": "Q1", "target_co2_kg": 10.0, "period_start": "2025-01-01", "period_end": "2025-03-31"})),
    )
    .await;
    let goal_id = goal["id"].as_str().unwrap();

    for date in ["2025-02-01T09:00:00Z", "2025-05-01T09:00:00Z"] {
        call(
            &app,
            "POST",
            "/api/journeys",
            &token,
            Some(json!({
                "transport_mode": "car",
                "origin": "A",
                "destination": "B",
                "distance_km": 10.0,
                "journey_date": date
            })),
        )
        .await;
    }

    let (status, progress) = call(&app, "GET", &format!("/api/goals/{goal_id}/progress"), &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["emitted_co2_kg"], 1.92);
    assert_eq!(progress["status"], "on_track");
}

#[tokio::test]
async fn test_messages_and_admin_flow() {
    require_database!();
    let (app, state) = common::create_db_test_app().await;
    let (user_id, user_token) = register(&app).await;

    let admin_email = format!("admin-{}@example.com", Uuid::new_v4());
    let hash = hash_password("adminpass1").unwrap();
    let outcome = state
        .db
        .bootstrap_admin(&admin_email, "Admin", &hash, chrono::Utc::now())
        .await
        .unwrap();
    assert_eq!(outcome, AdminBootstrap::Created);
    let outcome = state
        .db
        .bootstrap_admin(&admin_email, "Admin", &hash, chrono::Utc::now())
        .await
        .unwrap();
    assert_eq!(outcome, AdminBootstrap::AlreadyAdmin);

    let login = json!({"email": admin_email, "password": "adminpass1"}).to_string();
    let response = app
        .clone()
        .oneshot(common::json_request("POST", "/auth/login", &login))
        .await
        .unwrap();
    let admin_token = common::body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, message) = call(
        &app,
        "POST",
        "/api/messages",
        &user_token,
        Some(json!({"subject": "Hello", "body": "Question about my stats"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let message_id = message["id"].as_str().unwrap().to_string();

    let (status, unread) = call(&app, "GET", "/api/admin/messages?unread=true", &admin_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(unread
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m["id"] == message_id.as_str()));

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/admin/messages/{message_id}/read"),
        &admin_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&app, "DELETE", &format!("/api/admin/users/{user_id}"), &admin_token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(state.db.get_user(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_vehicle_delete_keeps_journeys() {
    require_database!();
    let (app, _) = common::create_db_test_app().await;
    let (_, token) = register(&app).await;

    let (_, vehicle) = call(
        &app,
        "POST",
        "/api/vehicles",
        &token,
        Some(json!({"name": "Zoe", "vehicle_type": "car", "fuel_type": "electric", "co2_rate_g_per_km": 60.0})),
    )
    .await;
    let vehicle_id = vehicle["id"].as_str().unwrap().to_string();

    let (_, journey) = call(
        &app,
        "POST",
        "/api/journeys",
        &token,
        Some(json!({
            "transport_mode": "car",
            "vehicle_id": vehicle_id,
            "origin": "Home",
            "destination": "Gym",
            "distance_km": 5.0
        })),
    )
    .await;
    let journey_id = journey["id"].as_str().unwrap().to_string();
    assert_eq!(journey["co2_rate_g_per_km"], 60.0);

    let (status, _) = call(&app, "DELETE", &format!("/api/vehicles/{vehicle_id}"), &token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, journey) = call(&app, "GET", &format!("/api/journeys/{journey_id}"), &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(journey["vehicle_id"].is_null());
    assert_eq!(journey["co2_rate_g_per_km"], 60.0);
    assert_eq!(journey["co2_kg"], 0.3);
}

#[tokio::test]
async fn test_export_skips_journeys_without_coordinates() {
    require_database!();
    let (app, _) = common::create_db_test_app().await;
    let (_, token) = register(&app).await;

    let (_, mapped) = call(
        &app,
        "POST",
        "/api/journeys",
        &token,
        Some(json!({
            "transport_mode": "train",
            "origin": "Paris",
            "destination": "Lyon",
            "origin_lat": 48.8566,
            "origin_lng": 2.3522,
            "destination_lat": 45.7640,
            "destination_lng": 4.8357
        })),
    )
    .await;
    let (status, _) = call(
        &app,
        "POST",
        "/api/journeys",
        &token,
        Some(json!({"transport_mode": "bus", "origin": "A", "destination": "B", "distance_km": 4.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, export) = call(&app, "GET", "/api/journeys/export", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(export["type"], "FeatureCollection");
    let features = export["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["id"], mapped["id"]);
    assert_eq!(features[0]["geometry"]["type"], "LineString");
    assert_eq!(features[0]["properties"]["transport_mode"], "train");
}

#[tokio::test]
async fn test_moving_endpoint_with_same_distance_is_user_distance() {
    require_database!();
    let (app, _) = common::create_db_test_app().await;
    let (_, token) = register(&app).await;

    let (_, journey) = call(
        &app,
        "POST",
        "/api/journeys",
        &token,
        Some(json!({
            "transport_mode": "car",
            "origin": "Paris",
            "destination": "Versailles",
            "origin_lat": 48.8566,
            "origin_lng": 2.3522,
            "destination_lat": 48.8049,
            "destination_lng": 2.1204
        })),
    )
    .await;
    assert_eq!(journey["metadata"]["distance_source"], "great_circle");
    let journey_id = journey["id"].as_str().unwrap();

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/api/journeys/{journey_id}"),
        &token,
        Some(json!({
            "origin_lat": 48.8606,
            "origin_lng": 2.3376,
            "distance_km": journey["distance_km"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["distance_km"], journey["distance_km"]);
    assert_eq!(updated["metadata"]["distance_source"], "user");
    assert!(updated["route_polyline"].is_null());
}

#[tokio::test]
async fn test_account_delete_cascades_and_clears_cookie() {
    require_database!();
    let (app, state) = common::create_db_test_app().await;
    let (user_id, token) = register(&app).await;

    let (_, vehicle) = call(
        &app,
        "POST",
        "/api/vehicles",
        &token,
        Some(json!({"name": "Bike", "vehicle_type": "bike", "fuel_type": "electric"})),
    )
    .await;
    let vehicle_id: Uuid = vehicle["id"].as_str().unwrap().parse().unwrap();
    let (_, journey) = call(
        &app,
        "POST",
        "/api/journeys",
        &token,
        Some(json!({"transport_mode": "bike", "origin": "A", "destination": "B", "distance_km": 2.0})),
    )
    .await;
    let journey_id: Uuid = journey["id"].as_str().unwrap().parse().unwrap();

    let response = app
        .clone()
        .oneshot(common::authed_request("DELETE", "/api/account", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("co2_token="));
    assert!(cookie.contains("Max-Age=0"));

    assert!(state.db.get_user(user_id).await.unwrap().is_none());
    assert!(state.db.get_vehicle(user_id, vehicle_id).await.unwrap().is_none());
    assert!(state.db.get_journey(user_id, journey_id).await.unwrap().is_none());
    assert!(state.db.list_activities(user_id, 10).await.unwrap().is_empty());
}
