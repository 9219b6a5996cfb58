// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Messages from users to the administrators.

use crate::error::Result;
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::models::message::CreateMessageRequest;
use crate::models::Message;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/messages", get(list_messages).post(send_message))
}

async fn list_messages(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Message>>> {
    Ok(Json(state.db.list_messages_for_user(user.user_id).await?))
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let message = Message {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        subject: req.subject.trim().to_string(),
        body: req.body,
        is_read: false,
        created_at: Utc::now(),
    };
    state.db.create_message(&message).await?;

    tracing::info!(user_id = %user.user_id, message_id = %message.id, "Message sent");
    Ok((StatusCode::CREATED, Json(message)))
}
