// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes. `require_admin` is applied in routes/mod.rs.

use crate::db::PlatformTotals;
use crate::error::{AppError, Result};
use crate::extract::{ValidQuery, ValidUuid};
use crate::middleware::auth::AuthUser;
use crate::models::user::UserOverview;
use crate::models::MessageWithSender;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}", delete(delete_user))
        .route("/api/admin/messages", get(list_messages))
        .route("/api/admin/messages/{id}/read", put(mark_read))
        .route("/api/admin/stats", get(platform_stats))
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserOverview>>> {
    Ok(Json(state.db.list_users_overview().await?))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    ValidUuid(id): ValidUuid,
) -> Result<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "Administrators cannot delete their own account here".to_string(),
        ));
    }

    if !state.db.delete_user(id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(admin_id = %admin.user_id, user_id = %id, "Admin deleted user");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize, Validate)]
struct MessagesQuery {
    #[serde(default)]
    unread: bool,
}

async fn list_messages(
    State(state): State<Arc<AppState>>,
    ValidQuery(params): ValidQuery<MessagesQuery>,
) -> Result<Json<Vec<MessageWithSender>>> {
    Ok(Json(state.db.list_all_messages(params.unread).await?))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<StatusCode> {
    if !state.db.mark_message_read(id).await? {
        return Err(AppError::NotFound("Message not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn platform_stats(State(state): State<Arc<AppState>>) -> Result<Json<PlatformTotals>> {
    Ok(Json(state.db.platform_totals().await?))
}
