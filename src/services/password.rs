// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing and strength rules.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use std::sync::OnceLock;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// Hash a password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Check a password against a stored hash.
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

/// Run a full verification against a throwaway hash and report a mismatch.
///
/// Login calls this when no account matches the email, so that path costs
/// the same Argon2 work as a wrong password.
pub fn verify_against_dummy(password: &str) -> bool {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    if let Some(hash) = DUMMY_HASH.get_or_init(|| hash_password("no such account 0").ok()) {
        verify_password(password, hash);
    }
    false
}

/// Minimal strength rules: length, at least one letter and one digit.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooWeak(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if password.chars().count() > MAX_PASSWORD_LEN {
        return Err(PasswordError::TooWeak(format!(
            "password must be at most {} characters",
            MAX_PASSWORD_LEN
        )));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::TooWeak(
            "password must contain at least one number".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err(PasswordError::TooWeak(
            "password must contain at least one letter".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password too weak: {0}")]
    TooWeak(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl From<PasswordError> for crate::error::AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooWeak(msg) => crate::error::AppError::BadRequest(msg),
            PasswordError::Hashing(msg) => {
                crate::error::AppError::Internal(anyhow::anyhow!(msg))
            }
        }
    }
}
