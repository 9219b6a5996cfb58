// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bootstrap an administrator account.
//!
//! Reads `ADMIN_EMAIL`, `ADMIN_PASSWORD` and optionally `ADMIN_NAME` along with
//! `DATABASE_URL`. Running it again for the same email is harmless: an
//! existing account is promoted, an existing admin is left alone.

use anyhow::{bail, Context};
use co2_tracker::db::{users::AdminBootstrap, PgDb};
use co2_tracker::routes::auth::normalize_email;
use co2_tracker::services::password::{hash_password, validate_password};
use std::env;

const DEFAULT_ADMIN_NAME: &str = "Administrator";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let email = normalize_email(&env::var("ADMIN_EMAIL").context("ADMIN_EMAIL must be set")?);
    let password = env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?;
    let name = env::var("ADMIN_NAME")
        .ok()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string());

    if !email.contains('@') {
        bail!("ADMIN_EMAIL is not an email address: {email}");
    }
    validate_password(&password)?;
    let password_hash = hash_password(&password)?;

    let db = PgDb::connect(&database_url, 1).await?;
    db.migrate().await?;

    let outcome = db
        .bootstrap_admin(&email, &name, &password_hash, chrono::Utc::now())
        .await?;

    match outcome {
        AdminBootstrap::Created => tracing::info!(email = %email, "Administrator created"),
        AdminBootstrap::Promoted => {
            tracing::info!(email = %email, "Existing account promoted to administrator")
        }
        AdminBootstrap::AlreadyAdmin => {
            tracing::info!(email = %email, "Account is already an administrator")
        }
    }
    Ok(())
}
