// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and logout.

use crate::error::{AppError, Result};
use crate::extract::ValidJson;
use crate::middleware::auth::{create_jwt, removal_cookie, session_cookie};
use crate::models::{Role, User, UserResponse};
use crate::models::validation::not_blank;
use crate::services::password::{
    hash_password, validate_password, verify_against_dummy, verify_password,
};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Authentication routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email, length(max = 254))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Session response. The token is also set as a cookie.
#[derive(Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Emails are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: User,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let token = create_jwt(user.id, user.role, &state.config.jwt_signing_key)?;
    let jar = jar.add(session_cookie(token.clone(), state.config.secure_cookies()));
    Ok((
        jar,
        Json(SessionResponse {
            user: user.into(),
            token,
        }),
    ))
}

async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<impl IntoResponse> {
    validate_password(&req.password)?;

    let email = normalize_email(&req.email);
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email,
        password_hash: hash_password(&req.password)?,
        name: req.name.trim().to_string(),
        role: Role::User,
        created_at: now,
        updated_at: now,
    };

    state.db.create_user(&user).await.map_err(|e| match e {
        AppError::Conflict(_) => AppError::Conflict("Email already registered".to_string()),
        other => other,
    })?;

    let (jar, body) = start_session(&state, jar, user)?;
    Ok((StatusCode::CREATED, jar, body))
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    let email = normalize_email(&req.email);
    let Some(user) = state.db.get_user_by_email(&email).await? else {
        verify_against_dummy(&req.password);
        tracing::info!("Login failed: unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&req.password, &user.password_hash) {
        tracing::info!(user_id = %user.id, "Login failed: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!(user_id = %user.id, "User logged in");
    start_session(&state, jar, user)
}

async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(removal_cookie(state.config.secure_cookies()));
    (StatusCode::NO_CONTENT, jar)
}
