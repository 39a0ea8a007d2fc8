//! Date normalization for keytool output.
//!
//! keytool renders validity dates like `Mon Jan 02 15:04:05 UTC 2023`, in the
//! JVM's default zone. They are normalized to [`CERT_DATE_FORMAT`] wall-clock
//! strings and then to epoch seconds in the local zone.

use chrono::{Local, NaiveDateTime, TimeZone};

use crate::error::{DiscoveryError, Result};

/// Canonical certificate date format.
pub const CERT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// keytool format with the weekday and zone tokens removed
const KEYTOOL_DATE_FORMAT: &str = "%b %d %H:%M:%S %Y";

/// Converts a keytool date to the canonical `YYYY-MM-DD HH:MM:SS` form.
///
/// The weekday is not checked against the date. The zone abbreviation is
/// dropped: chrono cannot resolve abbreviations and the value is wall-clock
/// time in the JVM's zone anyway.
pub fn format_keytool_date(raw: &str) -> Result<String> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() != 6 {
        return Err(DiscoveryError::date_parse(
            raw,
            "expected <weekday> <month> <day> <time> <zone> <year>",
        ));
    }

    let date_part = format!("{} {} {} {}", tokens[1], tokens[2], tokens[3], tokens[5]);
    let parsed = NaiveDateTime::parse_from_str(&date_part, KEYTOOL_DATE_FORMAT)
        .map_err(|e| DiscoveryError::date_parse(raw, e))?;

    Ok(parsed.format(CERT_DATE_FORMAT).to_string())
}

/// Converts a canonical date string to epoch seconds in the local zone.
pub fn convert_to_timestamp(date: &str) -> Result<i64> {
    convert_to_timestamp_in(date, &Local)
}

/// Converts a canonical date string to epoch seconds in `tz`.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times that
/// do not exist in `tz` are an error.
pub fn convert_to_timestamp_in<Tz: TimeZone>(date: &str, tz: &Tz) -> Result<i64> {
    let naive = NaiveDateTime::parse_from_str(date, CERT_DATE_FORMAT)
        .map_err(|e| DiscoveryError::date_parse(date, e))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| DiscoveryError::date_parse(date, "time does not exist in the local zone"))
}

/// Renders epoch seconds as a canonical local date string.
pub fn format_timestamp(timestamp: i64) -> Result<String> {
    format_timestamp_in(timestamp, &Local)
}

/// Renders epoch seconds as a canonical date string in `tz`.
pub fn format_timestamp_in<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    tz.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format(CERT_DATE_FORMAT).to_string())
        .ok_or_else(|| DiscoveryError::date_parse(&timestamp.to_string(), "timestamp out of range"))
}
