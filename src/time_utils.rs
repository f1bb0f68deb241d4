// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Local, NaiveDateTime};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format an API timestamp for display.
///
/// RFC 3339 timestamps are shown in local time; zone-less ISO 8601 ones
/// (`2026-03-01T08:20:00.123`) as they are. Anything else is returned as is.
pub fn format_api_timestamp(raw: &str) -> String {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return date.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return date.format(DISPLAY_FORMAT).to_string();
    }
    raw.to_string()
}
