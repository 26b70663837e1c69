//! Lenient parsing of the free-form date strings found in records

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Parse an RFC 3339 timestamp, a naive `YYYY-MM-DD HH:MM:SS` / `T`
/// timestamp, or a bare `YYYY-MM-DD` date (taken as midnight UTC)
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Calendar date of a record date string
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_datetime(raw).map(|ts| ts.date_naive())
}

/// Render a date the way answers show it, e.g. `Mar 4, 2026`
pub fn format_long(ts: DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// Render a month and day, e.g. `Oct 26`
pub fn format_short(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}
