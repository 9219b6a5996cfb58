//! Emission statistics folded from a user's journeys.
//!
//! The dashboard needs totals per mode, per month and per year. These are
//! computed by folding journey rows one at a time, so the same code serves
//! both the full-history view and the single-year view.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::models::journey::JourneyEmission;
use crate::models::transport::TransportMode;
use crate::services::emissions;
use crate::time_utils::{month_key, year_key};

/// Per-mode totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ModeBreakdown {
    pub journeys: u32,
    pub distance_km: f64,
    pub co2_kg: f64,
}

/// Aggregated emission statistics for a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EmissionStats {
    // ─── Totals ──────────────────────────────────────────────────
    pub total_journeys: u32,
    pub total_distance_km: f64,
    pub total_co2_kg: f64,
    /// CO₂ saved compared with driving every journey in the reference car
    pub avoided_co2_kg: f64,

    // ─── By Transport Mode ───────────────────────────────────────
    pub by_mode: HashMap<TransportMode, ModeBreakdown>,

    // ─── Time Series ─────────────────────────────────────────────
    /// CO₂ per month ("YYYY-MM")
    pub co2_by_month: HashMap<String, f64>,
    /// CO₂ per year ("YYYY")
    pub co2_by_year: HashMap<String, f64>,

    // ─── Idempotency ─────────────────────────────────────────────
    #[serde(skip)]
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    recorded: HashSet<Uuid>,
}

impl EmissionStats {
    /// Fold a set of journeys.
    pub fn from_journeys<'a>(journeys: impl IntoIterator<Item = &'a JourneyEmission>) -> Self {
        let mut stats = Self::default();
        for journey in journeys {
            stats.record(journey);
        }
        stats
    }

    /// Add a journey to the totals.
    ///
    /// Returns `false` if this journey was already recorded.
    pub fn record(&mut self, journey: &JourneyEmission) -> bool {
        if !self.recorded.insert(journey.id) {
            return false;
        }

        self.total_journeys += 1;
        self.total_distance_km += journey.distance_km;
        self.total_co2_kg += journey.co2_kg;
        self.avoided_co2_kg += emissions::avoided_co2_kg(journey.distance_km, journey.co2_kg);

        let mode = self.by_mode.entry(journey.transport_mode).or_default();
        mode.journeys += 1;
        mode.distance_km += journey.distance_km;
        mode.co2_kg += journey.co2_kg;

        *self
            .co2_by_month
            .entry(month_key(journey.journey_date))
            .or_insert(0.0) += journey.co2_kg;
        *self
            .co2_by_year
            .entry(year_key(journey.journey_date))
            .or_insert(0.0) += journey.co2_kg;

        true
    }

    /// Years with at least one journey, most recent first.
    pub fn available_years(&self) -> Vec<String> {
        let mut years: Vec<String> = self.co2_by_year.keys().cloned().collect();
        years.sort_by(|a, b| b.cmp(a));
        years
    }
}

/// How a goal is tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    OnTrack,
    AtRisk,
    Exceeded,
}

/// Share of the budget at which a goal is flagged as at risk.
const AT_RISK_PERCENT: f64 = 80.0;

/// Progress of a carbon goal over its period.
#[derive(Debug, Clone, Serialize)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    pub target_co2_kg: f64,
    pub emitted_co2_kg: f64,
    pub remaining_co2_kg: f64,
    pub percent_used: f64,
    pub status: GoalStatus,
}

impl GoalProgress {
    pub fn compute(goal_id: Uuid, target_co2_kg: f64, emitted_co2_kg: f64) -> Self {
        let percent_used = if target_co2_kg > 0.0 {
            emitted_co2_kg / target_co2_kg * 100.0
        } else {
            0.0
        };

        let status = if percent_used > 100.0 {
            GoalStatus::Exceeded
        } else if percent_used >= AT_RISK_PERCENT {
            GoalStatus::AtRisk
        } else {
            GoalStatus::OnTrack
        };

        Self {
            goal_id,
            target_co2_kg,
            emitted_co2_kg,
            remaining_co2_kg: (target_co2_kg - emitted_co2_kg).max(0.0),
            percent_used,
            status,
        }
    }
}

/// Half-open UTC range `[start, end)` covering the inclusive date range.
pub fn date_range_bounds(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = start.and_time(chrono::NaiveTime::MIN).and_utc();
    let until = end
        .succ_opt()
        .unwrap_or(end)
        .and_time(chrono::NaiveTime::MIN)
        .and_utc();
    (from, until)
}

/// UTC bounds of a calendar year.
pub fn year_bounds(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
    Some(date_range_bounds(start, end))
}
