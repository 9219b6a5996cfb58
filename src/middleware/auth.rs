// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.

use crate::error::AppError;
use crate::models::Role;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "co2_token";

/// Session lifetime.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user UUID)
    pub sub: String,
    /// Role at the time the token was issued
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Middleware that requires valid JWT authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) => token.to_string(),
            None => return Err(AppError::Unauthorized),
        }
    };

    let auth_user = verify_jwt(&token, &state.config.jwt_signing_key)?;
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Middleware that rejects non-admin sessions. Must run after `require_auth`.
pub async fn require_admin(
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !user.is_admin() {
        tracing::warn!(user_id = %user.user_id, "Non-admin attempted admin route");
        return Err(AppError::Forbidden);
    }
    Ok(next.run(request).await)
}

/// Decode and validate a session token.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Result<AuthUser, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        AppError::InvalidToken
    })?;

    let user_id: Uuid = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AppError::InvalidToken)?;

    Ok(AuthUser {
        user_id,
        role: token_data.claims.role,
    })
}

/// Create a JWT for a user session.
pub fn create_jwt(user_id: Uuid, role: Role, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        iat: usize::try_from(now)?,
        exp: usize::try_from(now + SESSION_TTL_SECS)?,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Session cookie carrying `token`.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS))
        .build()
}

/// Expired session cookie with the same attributes as `session_cookie`.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_jwt_key_32_bytes_minimum!!!";

    #[test]
    fn test_jwt_round_trip() {
        let user_id = Uuid::new_v4();
        let token = create_jwt(user_id, Role::Admin, KEY).unwrap();

        let user = verify_jwt(&token, KEY).unwrap();
        assert_eq!(user.user_id, user_id);
        assert!(user.is_admin());
    }

    #[test]
    fn test_jwt_wrong_key_rejected() {
        let token = create_jwt(Uuid::new_v4(), Role::User, KEY).unwrap();
        let err = verify_jwt(&token, b"another_key_that_is_32_bytes_long").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), true).to_string();
        assert!(cookie.starts_with("co2_token=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains(&format!("Max-Age={}", SESSION_TTL_SECS)));
    }

    #[test]
    fn test_removal_cookie_matches_session_attributes() {
        let cookie = removal_cookie(false).to_string();
        assert!(cookie.starts_with("co2_token=;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(!cookie.contains("Secure"));
    }
}
