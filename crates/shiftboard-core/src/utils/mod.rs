//! Utility functions for dates and display formatting.

pub mod dates;
pub mod format;

pub use dates::{day_bounds, next_day, parse_date, parse_timestamp, query_date};
pub use format::{format_optional, format_time_range, truncate_string};
