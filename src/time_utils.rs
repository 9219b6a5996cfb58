// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC3339 timestamp into UTC.
pub fn parse_utc_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// "YYYY-MM" bucket for monthly aggregates.
pub fn month_key(date: DateTime<Utc>) -> String {
    date.format("%Y-%m").to_string()
}

/// "YYYY" bucket for yearly aggregates.
pub fn year_key(date: DateTime<Utc>) -> String {
    date.format("%Y").to_string()
}
