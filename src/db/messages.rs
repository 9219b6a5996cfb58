// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User-to-admin messages.

use uuid::Uuid;

use super::activities::insert_activity;
use super::PgDb;
use crate::error::AppError;
use crate::models::{Activity, ActivityKind, Message, MessageWithSender};

impl PgDb {
    /// Store a message and its `message_sent` activity.
    pub async fn create_message(&self, message: &Message) -> Result<(), AppError> {
        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, user_id, subject, body, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id)
        .bind(message.user_id)
        .bind(&message.subject)
        .bind(&message.body)
        .bind(message.is_read)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        insert_activity(
            &mut *tx,
            &Activity::new(
                message.user_id,
                ActivityKind::MessageSent,
                format!("Sent message \"{}\"", message.subject),
                serde_json::json!({ "message_id": message.id }),
            ),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn list_messages_for_user(&self, user_id: Uuid) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, user_id, subject, body, is_read, created_at
            FROM messages
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool()?)
        .await?;
        Ok(messages)
    }

    /// Every message with its sender's email, optionally only unread ones.
    pub async fn list_all_messages(&self, unread_only: bool) -> Result<Vec<MessageWithSender>, AppError> {
        let messages = sqlx::query_as::<_, MessageWithSender>(
            r#"
            SELECT m.id, m.user_id, u.email AS sender_email, m.subject, m.body, m.is_read, m.created_at
            FROM messages m
            JOIN users u ON u.id = m.user_id
            WHERE NOT $1 OR NOT m.is_read
            ORDER BY m.created_at DESC
            "#,
        )
        .bind(unread_only)
        .fetch_all(self.pool()?)
        .await?;
        Ok(messages)
    }

    /// Returns `false` if no such message exists.
    pub async fn mark_message_read(&self, message_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE messages SET is_read = true WHERE id = $1")
            .bind(message_id)
            .execute(self.pool()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
