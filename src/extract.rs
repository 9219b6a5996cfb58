// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Custom axum extractors.
//!
//! Body, query and path rejections all surface as `AppError::BadRequest`, and
//! bodies/queries are run through `validator` before the handler sees them.

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// JSON body that has been deserialized and validated.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string that has been deserialized and validated.
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Extract and validate a UUID from path
pub struct ValidUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidUuid
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("Missing id".to_string()))?;

        let uuid = Uuid::parse_str(&id)
            .map_err(|_| AppError::BadRequest(format!("Invalid id '{}': not a UUID", id)))?;

        Ok(Self(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::{
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Named {
        #[validate(length(min = 1, max = 5))]
        name: String,
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/named",
                post(|ValidJson(body): ValidJson<Named>| async move { body.name }),
            )
            .route(
                "/items/{id}",
                get(|ValidUuid(id): ValidUuid| async move { id.to_string() }),
            )
    }

    async fn status(request: Request<Body>) -> StatusCode {
        app().oneshot(request).await.unwrap().status()
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/named")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_json_accepts_good_body() {
        assert_eq!(status(post_json(r#"{"name":"abc"}"#)).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        assert_eq!(status(post_json("{not json")).await, StatusCode::BAD_REQUEST);
        assert_eq!(status(post_json(r#"{"other":1}"#)).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validation_failure_is_bad_request() {
        assert_eq!(
            status(post_json(r#"{"name":"far too long"}"#)).await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_invalid_uuid_is_bad_request() {
        let request = Request::builder()
            .uri("/items/not-a-uuid")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status(request).await, StatusCode::BAD_REQUEST);

        let id = Uuid::new_v4();
        let request = Request::builder()
            .uri(format!("/items/{id}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(status(request).await, StatusCode::OK);
    }
}
