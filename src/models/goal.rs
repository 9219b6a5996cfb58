// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Carbon budget goals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::validation::not_blank;

/// A CO₂ budget over a date range (inclusive on both ends).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CarbonGoal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub target_co2_kg: f64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_create_period"))]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub title: String,
    #[validate(range(exclusive_min = 0.0, max = 1_000_000.0))]
    pub target_co2_kg: f64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateGoalRequest {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(range(exclusive_min = 0.0, max = 1_000_000.0))]
    pub target_co2_kg: Option<f64>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

fn validate_create_period(req: &CreateGoalRequest) -> Result<(), ValidationError> {
    check_period(req.period_start, req.period_end)
}

/// `period_end` must not precede `period_start`.
pub fn check_period(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        let mut err = ValidationError::new("period");
        err.message = Some("period_end must not be before period_start".into());
        return Err(err);
    }
    Ok(())
}

impl CarbonGoal {
    pub fn from_request(user_id: Uuid, req: CreateGoalRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: req.title.trim().to_string(),
            target_co2_kg: req.target_co2_kg,
            period_start: req.period_start,
            period_end: req.period_end,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, re-checking the period afterwards.
    pub fn apply(&mut self, req: UpdateGoalRequest, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let start = req.period_start.unwrap_or(self.period_start);
        let end = req.period_end.unwrap_or(self.period_end);
        check_period(start, end)?;

        if let Some(title) = req.title {
            self.title = title.trim().to_string();
        }
        if let Some(target) = req.target_co2_kg {
            self.target_co2_kg = target;
        }
        self.period_start = start;
        self.period_end = end;
        self.updated_at = now;
        Ok(())
    }
}
