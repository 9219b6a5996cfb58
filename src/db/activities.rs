// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity feed storage.

use sqlx::PgExecutor;
use uuid::Uuid;

use super::PgDb;
use crate::error::AppError;
use crate::models::Activity;

/// Insert an activity on any executor, so callers can write it inside the
/// same transaction as the row it describes.
pub(crate) async fn insert_activity<'e, E>(executor: E, activity: &Activity) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO activities (id, user_id, activity_type, description, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(activity.id)
    .bind(activity.user_id)
    .bind(&activity.activity_type)
    .bind(&activity.description)
    .bind(&activity.metadata)
    .bind(activity.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

impl PgDb {
    /// Most recent activities for a user.
    pub async fn list_activities(&self, user_id: Uuid, limit: i64) -> Result<Vec<Activity>, AppError> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, user_id, activity_type, description, metadata, created_at
            FROM activities
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool()?)
        .await?;
        Ok(activities)
    }
}
