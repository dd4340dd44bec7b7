//! Canonical timestamp form.
//!
//! Storage compares timestamps as strings, so every timestamp that enters
//! a record or a range filter is rendered as fixed-width UTC with
//! millisecond precision: `2024-05-01T08:30:00.000Z`.

use chrono::{DateTime, SecondsFormat, Utc};

/// Renders a timestamp in the canonical sortable form.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 timestamp (any offset) into UTC.
///
/// # Errors
///
/// Returns the underlying `chrono` parse error for malformed input.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s.trim()).map(|dt| dt.with_timezone(&Utc))
}
