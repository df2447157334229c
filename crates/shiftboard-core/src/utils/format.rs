use chrono::NaiveDateTime;

use super::dates::parse_timestamp;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

fn format_clock(ts: &NaiveDateTime) -> String {
    ts.format("%H:%M").to_string()
}

/// Compact time window: "Jan 05 09:00-17:00", or with both dates when the
/// window spans midnight. Unparseable values are shown raw.
pub fn format_time_range(start: Option<&str>, end: Option<&str>) -> String {
    let parsed_start = start.and_then(parse_timestamp);
    let parsed_end = end.and_then(parse_timestamp);

    match (parsed_start, parsed_end) {
        (Some(s), Some(e)) if s.date() == e.date() => {
            format!("{} {}-{}", s.format("%b %d"), format_clock(&s), format_clock(&e))
        }
        (Some(s), Some(e)) => format!("{} - {}", s.format("%b %d %H:%M"), e.format("%b %d %H:%M")),
        (Some(s), None) => format!("{} -", s.format("%b %d %H:%M")),
        _ => match (start, end) {
            (Some(s), Some(e)) => format!("{} - {}", s, e),
            (Some(s), None) => s.to_string(),
            _ => "TBD".to_string(),
        },
    }
}
