//! Date helpers for range queries and the per-day filter.
//!
//! The server sends timestamps either as RFC 3339 (with offset) or as naive
//! ISO strings. All comparisons happen on naive UTC values: offset timestamps
//! are converted to UTC, naive ones are taken as already being UTC.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime};

/// Naive timestamp layouts accepted in addition to RFC 3339
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a date or timestamp string and keep its calendar date.
///
/// Accepts `YYYY-MM-DD`, naive ISO timestamps and RFC 3339 timestamps. For
/// offset timestamps the date is the one written in the string, not the UTC
/// date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.date_naive());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| anyhow!("Invalid date: {:?}", input))
}

/// Parse a timestamp into naive UTC. Returns `None` for anything unparseable.
///
/// A bare date is read as midnight of that day.
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
    {
        return Some(dt);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Date-only ISO form used in query strings
pub fn query_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn next_day(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(1))
        .ok_or_else(|| anyhow!("Date {} has no following day", date))
}

/// Midnight of `date` and midnight of the following day
pub fn day_bounds(date: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = date.and_time(NaiveTime::MIN);
    let end = start.checked_add_days(Days::new(1))?;
    Some((start, end))
}
