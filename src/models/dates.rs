//! Date handling shared by loans and bookings.
//!
//! Back ends answer with RFC 3339 timestamps but accept (and sometimes echo back)
//! plain `YYYY-MM-DD` dates, so both are accepted everywhere. A plain date is read
//! as midnight UTC.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc));
    }
    parse_date(input).and_then(|date| date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive)))
}

/// Parse the calendar date of an RFC 3339 timestamp or a `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc).date_naive())
}

/// Format a timestamp the way date inputs expect it
pub fn format_date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// `deserialize_with` for a required timestamp
pub fn flexible<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
}

/// `deserialize_with` for an optional timestamp; `null` and `""` both mean absent
pub fn flexible_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw))),
    }
}
