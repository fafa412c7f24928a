//! Canonicalization of raw review fields: text, ratings, dates and marketplace names.
//!
//! Every public function here is pure. The `try_*`/`coerce_*` variants report
//! why a value was rejected; the plain variants fall back to a safe default so
//! a single malformed field never aborts an aggregation run.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex_lite::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

/// Rating scale used when none is configured.
pub const DEFAULT_RATING_SCALE: u32 = 5;

static NON_ALNUM_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Basic ISO-8601: `YYYYMMDD`, optionally `THH`, `THHMM` or `THHMMSS`.
static COMPACT_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})(?:T(\d{2})(?:(\d{2})(\d{2})?)?)?Z?$").unwrap()
});

/// Extended ISO-8601 with hour precision: `YYYY-MM-DDTHH`.
static HOUR_DATETIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})[T ](\d{2})Z?$").unwrap());

/// Why a raw field value could not be normalized.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("value is not numeric: {0}")]
    NotNumeric(String),

    #[error("date is empty")]
    EmptyDate,

    #[error("unrecognized date format: '{0}'")]
    UnrecognizedDate(String),

    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: u32, max: u32 },
}

/// Replaces line breaks with spaces, collapses whitespace runs and trims.
pub fn clean_text(text: Option<&str>) -> String {
    match text {
        // split_whitespace treats \r and \n as separators
        Some(text) => text.split_whitespace().collect::<Vec<_>>().join(" "),
        None => String::new(),
    }
}

/// Coerces a raw JSON value to a float.
///
/// Numbers pass through, strings are parsed after trimming and booleans map to
/// 1.0/0.0. NaN is rejected.
pub fn coerce_rating(raw: &Value) -> Result<f64, NormalizeError> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match value {
        Some(v) if !v.is_nan() => Ok(v),
        _ => Err(NormalizeError::NotNumeric(raw.to_string())),
    }
}

/// Clamps a rating to `[0, scale]` and rounds it to two decimals.
pub fn clamp_rating(value: f64, scale: u32) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    round_hundredths(value.clamp(0.0, f64::from(scale)))
}

/// Rounds a finite value to two decimals by its exact binary value, sending
/// exact halves to the even digit (`2.675 -> 2.67`, `0.125 -> 0.12`).
fn round_hundredths(value: f64) -> f64 {
    // Only multiples of 1/8 with an odd numerator sit exactly halfway
    // between two hundredths; scaling by 8 and 100 is exact for them.
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        let lower = (value * 100.0).floor();
        let even = if lower % 2.0 == 0.0 { lower } else { lower + 1.0 };
        return even / 100.0;
    }

    // Float formatting rounds the exact value, so no ties remain here
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Normalizes a raw rating; non-numeric input yields 0.0.
pub fn normalize_rating(raw: &Value, scale: u32) -> f64 {
    coerce_rating(raw).map(|v| clamp_rating(v, scale)).unwrap_or(0.0)
}

/// Serializes a date/time as ISO-8601 in UTC with a `Z` suffix.
///
/// Microseconds are included only when non-zero.
pub fn format_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    let utc = dt.with_timezone(&Utc);
    if utc.timestamp_subsec_micros() == 0 {
        utc.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    } else {
        utc.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
    }
}

/// Serializes a date/time without offset, taking it to be UTC.
pub fn format_naive(naive: NaiveDateTime) -> String {
    format_datetime(&naive.and_utc())
}

/// Parses a date string into a UTC timestamp.
///
/// The strict formats are tried first, in order:
/// `YYYY-MM-DDTHH:MM:SS.ffffffZ`, `YYYY-MM-DDTHH:MM:SS±HHMM`, `YYYY-MM-DD`,
/// `YYYY-MM-DD HH:MM:SS`. After that, generic ISO-8601 shapes are accepted.
/// Values without an offset are UTC.
pub fn try_parse_datetime(value: &str) -> Result<DateTime<Utc>, NormalizeError> {
    let text = value.trim();
    if text.is_empty() {
        return Err(NormalizeError::EmptyDate);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.fZ") {
        return Ok(naive.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }

    parse_iso8601(text).ok_or_else(|| NormalizeError::UnrecognizedDate(text.to_string()))
}

/// Generic ISO-8601 fallback: offsets with a colon, `T` or space separators,
/// optional fractions, minute or hour precision and the basic `YYYYMMDD` form.
fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
    {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    parse_numeric_fields(&HOUR_DATETIME, text)
        .or_else(|| parse_numeric_fields(&COMPACT_DATETIME, text))
}

/// Builds a UTC timestamp from year, month, day, hour, minute, second capture
/// groups; missing time groups are zero.
fn parse_numeric_fields(pattern: &Regex, text: &str) -> Option<DateTime<Utc>> {
    let caps = pattern.captures(text)?;
    let field = |i: usize| caps.get(i).map_or(Some(0), |m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)?;
    Some(date.and_hms_opt(field(4)?, field(5)?, field(6)?)?.and_utc())
}

/// Canonicalizes a date string.
///
/// Empty input yields an empty string. Unparseable input is returned trimmed
/// but otherwise unchanged, which downstream sorting treats as the oldest date.
pub fn parse_date(value: &str) -> String {
    let text = value.trim();
    if text.is_empty() {
        return String::new();
    }

    match try_parse_datetime(text) {
        Ok(dt) => format_datetime(&dt),
        Err(e) => {
            debug!("Could not parse date '{}' ({}), keeping as-is", value, e);
            text.to_string()
        }
    }
}

/// Canonicalizes a raw JSON date; only strings can carry a date.
pub fn parse_date_value(value: &Value) -> String {
    match value {
        Value::String(s) => parse_date(s),
        _ => String::new(),
    }
}

/// Lowercases a marketplace name and joins its alphanumeric runs with hyphens.
pub fn marketplace_slug(name: &str) -> String {
    NON_ALNUM_RUN.replace_all(&name.to_lowercase(), "-").trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use serde_json::json;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(Some("  Great\r\nproduct!  ")), "Great product!");
        assert_eq!(clean_text(Some("a\t\tb   c")), "a b c");
        assert_eq!(clean_text(Some("line1\rline2\nline3")), "line1 line2 line3");
        assert_eq!(clean_text(Some("   ")), "");
        assert_eq!(clean_text(None), "");
    }

    #[test]
    fn test_normalize_rating_examples() {
        assert_eq!(normalize_rating(&json!("bad"), 5), 0.0);
        assert_eq!(normalize_rating(&json!(7), 5), 5.0);
        assert_eq!(normalize_rating(&json!(-2), 5), 0.0);
        assert_eq!(normalize_rating(&json!(4.567), 5), 4.57);
        assert_eq!(normalize_rating(&json!("3.5"), 5), 3.5);
        assert_eq!(normalize_rating(&json!(8), 10), 8.0);
    }

    #[test]
    fn test_normalize_rating_non_numeric() {
        assert_eq!(normalize_rating(&Value::Null, 5), 0.0);
        assert_eq!(normalize_rating(&json!([4]), 5), 0.0);
        assert_eq!(normalize_rating(&json!({"stars": 4}), 5), 0.0);
        assert_eq!(normalize_rating(&json!("NaN"), 5), 0.0);
        assert_eq!(normalize_rating(&json!(""), 5), 0.0);
    }

    #[test]
    fn test_normalize_rating_infinite_clamps() {
        assert_eq!(normalize_rating(&json!("inf"), 5), 5.0);
        assert_eq!(normalize_rating(&json!("-inf"), 5), 0.0);
    }

    #[test]
    fn test_coerce_rating_errors() {
        let err = coerce_rating(&json!("bad")).unwrap_err();
        assert!(matches!(err, NormalizeError::NotNumeric(_)));
        assert!(err.to_string().contains("bad"));
        assert_eq!(coerce_rating(&json!(true)).unwrap(), 1.0);
    }

    #[test]
    fn test_clamp_rating() {
        assert_eq!(clamp_rating(f64::NAN, 5), 0.0);
        assert_eq!(clamp_rating(2.346, 5), 2.35);
        assert_eq!(clamp_rating(5.0001, 5), 5.0);
    }

    #[test]
    fn test_clamp_rating_rounds_exact_value() {
        // binary values just below the half round down
        assert_eq!(clamp_rating(2.675, 5), 2.67);
        assert_eq!(clamp_rating(1.115, 5), 1.11);
        assert_eq!(normalize_rating(&json!(2.675), 5), 2.67);

        // exact halves go to the even digit
        assert_eq!(clamp_rating(0.125, 5), 0.12);
        assert_eq!(clamp_rating(4.625, 5), 4.62);
        assert_eq!(clamp_rating(0.375, 5), 0.38);
        assert_eq!(clamp_rating(3.875, 5), 3.88);

        assert_eq!(clamp_rating(4.567, 5), 4.57);
        assert_eq!(clamp_rating(3.0, 5), 3.0);
        assert_eq!(clamp_rating(0.0, 5), 0.0);
    }

    #[test]
    fn test_parse_date_strict_formats() {
        assert_eq!(parse_date("2024-01-01T12:30:45.123456Z"), "2024-01-01T12:30:45.123456Z");
        assert_eq!(parse_date("2024-01-01T12:30:45+0200"), "2024-01-01T10:30:45Z");
        assert_eq!(parse_date("2024-01-01T12:30:45-0500"), "2024-01-01T17:30:45Z");
        assert_eq!(parse_date("2024-03-01"), "2024-03-01T00:00:00Z");
        assert_eq!(parse_date("2024-03-01 08:15:00"), "2024-03-01T08:15:00Z");
    }

    #[test]
    fn test_parse_date_iso_fallback() {
        assert_eq!(parse_date("2024-01-01T00:00:00Z"), "2024-01-01T00:00:00Z");
        assert_eq!(parse_date("2024-01-01T09:00:00+09:00"), "2024-01-01T00:00:00Z");
        assert_eq!(parse_date("2024-01-01T10:20:30"), "2024-01-01T10:20:30Z");
        assert_eq!(parse_date("2024-01-01T10:20"), "2024-01-01T10:20:00Z");
        assert_eq!(parse_date("2024-01-01 10:20:30.5"), "2024-01-01T10:20:30.500000Z");
    }

    #[test]
    fn test_parse_date_hour_and_basic_forms() {
        assert_eq!(parse_date("2024-01-01T10"), "2024-01-01T10:00:00Z");
        assert_eq!(parse_date("2024-01-01 10"), "2024-01-01T10:00:00Z");
        assert_eq!(parse_date("20240101"), "2024-01-01T00:00:00Z");
        assert_eq!(parse_date("20240101T10"), "2024-01-01T10:00:00Z");
        assert_eq!(parse_date("20240101T1030"), "2024-01-01T10:30:00Z");
        assert_eq!(parse_date("20240101T103045Z"), "2024-01-01T10:30:45Z");

        // out-of-range fields stay unparsed
        assert_eq!(parse_date("20241301"), "20241301");
        assert_eq!(parse_date("2024-01-01T25"), "2024-01-01T25");
        assert_eq!(parse_date("2024010"), "2024010");
    }

    #[test]
    fn test_parse_date_trims_input() {
        assert_eq!(parse_date("  2024-03-01  "), "2024-03-01T00:00:00Z");
    }

    #[test]
    fn test_parse_date_unparseable_passthrough() {
        assert_eq!(parse_date("last Tuesday"), "last Tuesday");
        assert_eq!(parse_date("  01/02/2024 "), "01/02/2024");
        assert_eq!(parse_date("2024-13-45"), "2024-13-45");
    }

    #[test]
    fn test_parse_date_empty() {
        assert_eq!(parse_date(""), "");
        assert_eq!(parse_date("   \t"), "");
        assert_eq!(try_parse_datetime(" ").unwrap_err(), NormalizeError::EmptyDate);
    }

    #[test]
    fn test_parse_date_value_non_string() {
        assert_eq!(parse_date_value(&json!(1704067200)), "");
        assert_eq!(parse_date_value(&Value::Null), "");
        assert_eq!(parse_date_value(&json!(true)), "");
        assert_eq!(parse_date_value(&json!("2024-03-01")), "2024-03-01T00:00:00Z");
    }

    #[test]
    fn test_format_datetime_native() {
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        let dt = offset.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap();
        assert_eq!(format_datetime(&dt), "2024-06-01T00:00:00Z");

        let naive = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_micro_opt(1, 2, 3, 42).unwrap();
        assert_eq!(format_naive(naive), "2024-06-01T01:02:03.000042Z");
    }

    #[test]
    fn test_try_parse_datetime_unrecognized() {
        let err = try_parse_datetime("yesterday").unwrap_err();
        assert_eq!(err, NormalizeError::UnrecognizedDate("yesterday".to_string()));
    }

    #[test]
    fn test_marketplace_slug() {
        assert_eq!(marketplace_slug("Amazon.com!!"), "amazon-com");
        assert_eq!(marketplace_slug("  eBay  "), "ebay");
        assert_eq!(marketplace_slug("Walmart -- US"), "walmart-us");
        assert_eq!(marketplace_slug("---"), "");
        assert_eq!(marketplace_slug("Best_Buy 2"), "best-buy-2");
    }
}
