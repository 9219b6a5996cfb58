// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User storage.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::activities::insert_activity;
use super::PgDb;
use crate::error::AppError;
use crate::models::user::UserOverview;
use crate::models::{Activity, ActivityKind, Role, User};

const USER_COLUMNS: &str = "id, email, password_hash, name, role, created_at, updated_at";

/// Platform-wide counters for the admin dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlatformTotals {
    pub users: i64,
    pub admins: i64,
    pub journeys: i64,
    pub vehicles: i64,
    pub unread_messages: i64,
    pub total_distance_km: f64,
    pub total_co2_kg: f64,
}

/// Outcome of an admin bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminBootstrap {
    Created,
    Promoted,
    AlreadyAdmin,
}

impl PgDb {
    /// Insert a user together with its `account_created` activity.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let mut tx = self.begin().await?;
        insert_user(&mut *tx, user).await?;
        insert_activity(
            &mut *tx,
            &Activity::new(
                user.id,
                ActivityKind::AccountCreated,
                "Account created",
                serde_json::json!({ "role": user.role.as_str() }),
            ),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "Created user");
        Ok(())
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool()?)
        .await?;
        Ok(user)
    }

    /// Look up a user by (already lowercased) email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool()?)
        .await?;
        Ok(user)
    }

    /// Persist name and password hash changes.
    pub async fn update_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET name = $2, password_hash = $3, updated_at = $4 WHERE id = $1")
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.updated_at)
            .execute(self.pool()?)
            .await?;
        Ok(())
    }

    /// Delete a user. Owned rows go with it through `ON DELETE CASCADE`.
    ///
    /// Returns `false` if no such user existed.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.pool()?)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(user_id = %user_id, "Deleted user and owned rows");
        }
        Ok(deleted)
    }

    /// All users with their journey totals, newest first.
    pub async fn list_users_overview(&self) -> Result<Vec<UserOverview>, AppError> {
        let users = sqlx::query_as::<_, UserOverview>(
            r#"
            SELECT u.id, u.email, u.name, u.role, u.created_at,
                   COUNT(j.id) AS journey_count,
                   COALESCE(SUM(j.co2_kg), 0)::float8 AS total_co2_kg
            FROM users u
            LEFT JOIN journeys j ON j.user_id = u.id
            GROUP BY u.id
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(self.pool()?)
        .await?;
        Ok(users)
    }

    pub async fn platform_totals(&self) -> Result<PlatformTotals, AppError> {
        let totals = sqlx::query_as::<_, PlatformTotals>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM users WHERE role = 'admin') AS admins,
                (SELECT COUNT(*) FROM journeys) AS journeys,
                (SELECT COUNT(*) FROM vehicles) AS vehicles,
                (SELECT COUNT(*) FROM messages WHERE NOT is_read) AS unread_messages,
                (SELECT COALESCE(SUM(distance_km), 0)::float8 FROM journeys) AS total_distance_km,
                (SELECT COALESCE(SUM(co2_kg), 0)::float8 FROM journeys) AS total_co2_kg
            "#,
        )
        .fetch_one(self.pool()?)
        .await?;
        Ok(totals)
    }

    /// Create an admin, or promote the existing account with that email.
    ///
    /// Runs in one transaction so a half-created admin is never visible.
    pub async fn bootstrap_admin(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<AdminBootstrap, AppError> {
        let mut tx = self.begin().await?;

        let existing: Option<(Uuid, String)> =
            sqlx::query_as("SELECT id, role FROM users WHERE email = $1 FOR UPDATE")
                .bind(email)
                .fetch_optional(&mut *tx)
                .await?;

        let outcome = match existing {
            Some((_, role)) if role == Role::Admin.as_str() => AdminBootstrap::AlreadyAdmin,
            Some((id, _)) => {
                sqlx::query("UPDATE users SET role = $2, updated_at = $3 WHERE id = $1")
                    .bind(id)
                    .bind(Role::Admin.as_str())
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;
                AdminBootstrap::Promoted
            }
            None => {
                let user = User {
                    id: Uuid::new_v4(),
                    email: email.to_string(),
                    password_hash: password_hash.to_string(),
                    name: name.to_string(),
                    role: Role::Admin,
                    created_at: now,
                    updated_at: now,
                };
                insert_user(&mut *tx, &user).await?;
                insert_activity(
                    &mut *tx,
                    &Activity::new(
                        user.id,
                        ActivityKind::AccountCreated,
                        "Administrator account created",
                        serde_json::json!({ "role": "admin" }),
                    ),
                )
                .await?;
                AdminBootstrap::Created
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }
}

async fn insert_user<'e, E>(executor: E, user: &User) -> Result<(), AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, name, role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(user.role.as_str())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}
