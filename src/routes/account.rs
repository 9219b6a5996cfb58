// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Current user's profile and account.

use crate::error::{AppError, Result};
use crate::extract::ValidJson;
use crate::middleware::auth::{removal_cookie, AuthUser};
use crate::models::UserResponse;
use crate::models::validation::not_blank;
use crate::services::password::{hash_password, validate_password};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).put(update_me))
        .route("/api/account", delete(delete_account))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(profile.into()))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    if let Some(password) = &req.password {
        validate_password(password)?;
    }

    let mut profile = state
        .db
        .get_user(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(name) = req.name {
        profile.name = name.trim().to_string();
    }
    if let Some(password) = req.password {
        profile.password_hash = hash_password(&password)?;
        tracing::info!(user_id = %user.user_id, "Password changed");
    }
    profile.updated_at = Utc::now();

    state.db.update_user(&profile).await?;
    Ok(Json(profile.into()))
}

/// Delete the account and everything it owns, and end the session.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    tracing::info!(user_id = %user.user_id, "Account deletion requested");

    if !state.db.delete_user(user.user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let jar = jar.add(removal_cookie(state.config.secure_cookies()));
    Ok((StatusCode::NO_CONTENT, jar))
}
