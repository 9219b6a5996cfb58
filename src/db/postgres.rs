// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PostgreSQL pool wrapper.
//!
//! Typed operations live next to their tables in the sibling modules
//! (`users`, `vehicles`, `journeys`, ...), each as an `impl PgDb` block.

use crate::error::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// PostgreSQL database client.
#[derive(Clone)]
pub struct PgDb {
    pool: Option<PgPool>,
}

impl PgDb {
    /// Connect to PostgreSQL with a bounded pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        tracing::info!(max_connections, "Connected to PostgreSQL");

        Ok(Self { pool: Some(pool) })
    }

    /// Create a mock database client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { pool: None }
    }

    /// Apply embedded migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        MIGRATOR
            .run(self.pool()?)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Helper to get the pool or return an error if offline.
    pub(crate) fn pool(&self) -> Result<&PgPool, AppError> {
        self.pool
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Start a transaction.
    pub(crate) async fn begin(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        Ok(self.pool()?.begin().await?)
    }

    /// Liveness check for the health endpoint.
    pub async fn ping(&self) -> bool {
        match self.pool() {
            Ok(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            Err(_) => false,
        }
    }
}
