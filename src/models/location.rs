//! Saved user locations (home, work, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::not_blank;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserLocation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// At most one default per user
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create request. Coordinates may be omitted if `address` can be geocoded.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub label: String,
    #[validate(length(min = 1, max = 500), custom(function = "not_blank"))]
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub label: Option<String>,
    #[validate(length(min = 1, max = 500), custom(function = "not_blank"))]
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub is_default: Option<bool>,
}

impl UserLocation {
    pub fn apply(&mut self, req: UpdateLocationRequest, now: DateTime<Utc>) {
        if let Some(label) = req.label {
            self.label = label.trim().to_string();
        }
        if req.address.is_some() {
            self.address = req.address;
        }
        if let Some(latitude) = req.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = req.longitude {
            self.longitude = longitude;
        }
        if let Some(is_default) = req.is_default {
            self.is_default = is_default;
        }
        self.updated_at = now;
    }
}
