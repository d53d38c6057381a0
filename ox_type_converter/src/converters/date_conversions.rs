//! Date conversion functions
//! 
//! Dates travel as `YYYY-MM-DD` on the wire. Inbound values may be ISO
//! datetimes, plain dates, US-style dates or epoch milliseconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parse a date from text. Zoned datetimes are normalized to their UTC day.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, WIRE_DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc).date_naive());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    NaiveDate::parse_from_str(value, "%m/%d/%Y").ok()
}

/// Convert a value to a date. Numbers are read as epoch milliseconds.
pub fn value_to_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

/// Format a date for the wire
pub fn format_date(date: NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("1990-04-12"), Some(day(1990, 4, 12)));
        assert_eq!(parse_date("1990-04-12T23:30:00-02:00"), Some(day(1990, 4, 13)));
        assert_eq!(parse_date("1990-04-12T08:15:00"), Some(day(1990, 4, 12)));
        assert_eq!(parse_date("04/12/1990"), Some(day(1990, 4, 12)));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("  "), None);
    }

    #[test]
    fn test_value_to_date() {
        assert_eq!(value_to_date(&json!(0)), Some(day(1970, 1, 1)));
        assert_eq!(value_to_date(&json!("2001-02-03")), Some(day(2001, 2, 3)));
        assert_eq!(value_to_date(&json!(null)), None);
        assert_eq!(value_to_date(&json!(true)), None);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(day(2024, 1, 5)), "2024-01-05");
    }
}
