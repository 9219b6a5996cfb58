// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

/// Minimum accepted length of the JWT signing key, in bytes.
const MIN_JWT_KEY_LEN: usize = 32;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL, used for CORS and cookie attributes
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Maximum number of pooled PostgreSQL connections
    pub db_max_connections: u32,
    /// Apply embedded migrations at startup
    pub run_migrations: bool,

    // --- Secrets ---
    /// PostgreSQL connection string
    pub database_url: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Google Maps Platform API key (geocoding, directions, air quality)
    pub google_maps_api_key: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self::test_default()
    }
}

impl Config {
    /// Offline configuration used by tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            db_max_connections: 2,
            run_migrations: false,
            database_url: "postgres://localhost/co2_tracker_test".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            google_maps_api_key: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
            .trim()
            .as_bytes()
            .to_vec();
        if jwt_signing_key.len() < MIN_JWT_KEY_LEN {
            return Err(ConfigError::Invalid {
                name: "JWT_SIGNING_KEY",
                reason: format!("must be at least {} bytes", MIN_JWT_KEY_LEN),
            });
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: parse_var("PORT", 8080)?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
            run_migrations: parse_var("RUN_MIGRATIONS", true)?,
            database_url: env::var("DATABASE_URL")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            jwt_signing_key,
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            reason: format!("could not parse '{}'", raw),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("DATABASE_URL", "postgres://localhost/co2");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!!");
        env::remove_var("PORT");
        env::remove_var("GOOGLE_MAPS_API_KEY");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.database_url, "postgres://localhost/co2");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_max_connections, 10);
        assert!(config.google_maps_api_key.is_none());
    }

    #[test]
    fn test_secure_cookies_follow_frontend_scheme() {
        let mut config = Config::test_default();
        assert!(!config.secure_cookies());

        config.frontend_url = "https://co2.example.org".to_string();
        assert!(config.secure_cookies());
    }
}
