//! Lap start timestamps as accepted from clients.
//!
//! Stored values are naive UTC; inputs carrying an offset are converted.

use chrono::{DateTime, NaiveDateTime};

use crate::errors::ModelError;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse RFC 3339, naive ISO 8601, or the `datetime-local` form without seconds.
pub fn parse_start_time(raw: &str) -> Result<NaiveDateTime, ModelError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| ModelError::invalid("startTime", format!("unrecognised timestamp `{raw}`")))
}
