// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity feed entries recorded as side effects of user actions.

use chrono::{DateTime, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

/// Kinds of activity written to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    AccountCreated,
    JourneyRecorded,
    VehicleAdded,
    GoalCreated,
    LocationSaved,
    MessageSent,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::AccountCreated => "account_created",
            ActivityKind::JourneyRecorded => "journey_recorded",
            ActivityKind::VehicleAdded => "vehicle_added",
            ActivityKind::GoalCreated => "goal_created",
            ActivityKind::LocationSaved => "location_saved",
            ActivityKind::MessageSent => "message_sent",
        }
    }
}

/// Stored activity record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    /// One of the `ActivityKind` strings
    pub activity_type: String,
    pub description: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, unknown>"))]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(
        user_id: Uuid,
        kind: ActivityKind,
        description: impl Into<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            activity_type: kind.as_str().to_string(),
            description: description.into(),
            metadata,
            created_at: Utc::now(),
        }
    }
}
