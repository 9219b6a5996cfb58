// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication tests.
//!
//! These tests verify that JWT tokens created by the auth routes decode with
//! the claim layout other services rely on, catching compatibility issues early.

use co2_tracker::middleware::auth::{create_jwt, verify_jwt, SESSION_TTL_SECS};
use co2_tracker::models::Role;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SIGNING_KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

/// Claims layout that must match what the middleware issues.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    exp: usize,
    iat: usize,
}

#[test]
fn test_jwt_roundtrip() {
    let user_id = Uuid::new_v4();
    let token = create_jwt(user_id, Role::Admin, SIGNING_KEY).unwrap();

    let key = DecodingKey::from_secret(SIGNING_KEY);
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(&token, &key, &validation)
        .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, user_id.to_string());
    assert_eq!(token_data.claims.role, "admin");
    assert!(token_data.claims.exp > token_data.claims.iat);
}

#[test]
fn test_jwt_verify_recovers_user() {
    let user_id = Uuid::new_v4();
    let token = create_jwt(user_id, Role::User, SIGNING_KEY).unwrap();

    let user = verify_jwt(&token, SIGNING_KEY).unwrap();
    assert_eq!(user.user_id, user_id);
    assert_eq!(user.role, Role::User);
    assert!(!user.is_admin());
}

#[test]
fn test_jwt_expiration_is_session_ttl() {
    let token = create_jwt(Uuid::new_v4(), Role::User, SIGNING_KEY).unwrap();

    let key = DecodingKey::from_secret(SIGNING_KEY);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false; // We'll check manually

    let token_data = decode::<Claims>(&token, &key, &validation).unwrap();
    let lifetime = token_data.claims.exp - token_data.claims.iat;
    assert_eq!(lifetime as i64, SESSION_TTL_SECS);
}

#[test]
fn test_jwt_with_non_uuid_subject_rejected() {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: "12345678".to_string(),
        role: "user".to_string(),
        exp: now + 3600,
        iat: now,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap();

    assert!(verify_jwt(&token, SIGNING_KEY).is_err());
}

#[test]
fn test_jwt_with_unknown_role_rejected() {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        role: "superuser".to_string(),
        exp: now + 3600,
        iat: now,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap();

    assert!(verify_jwt(&token, SIGNING_KEY).is_err());
}

#[test]
fn test_jwt_expired_rejected() {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        role: "user".to_string(),
        exp: now - 3600,
        iat: now - 7200,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap();

    assert!(verify_jwt(&token, SIGNING_KEY).is_err());
}
