//! Display formatting shared by every adapter: commission, validity window
//! and status inference.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::models::ActivityStatus;

/// China Standard Time, the zone supplier timestamps are written in.
const CST_OFFSET_SECS: i32 = 8 * 3600;

/// Unix values above this are milliseconds.
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

pub const UNKNOWN_VALIDITY: &str = "有效期未知";
pub const OPEN_START: &str = "即刻";
pub const OPEN_END: &str = "长期有效";

lazy_static! {
    /// First decimal number inside free text such as `约15.5%返`
    static ref DECIMAL_NUMBER: Regex =
        Regex::new(r"\d+(\.\d+)?").expect("Invalid regex pattern");
}

fn cst() -> FixedOffset {
    FixedOffset::east_opt(CST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Renders a commission rate. Rates above 1 are already percentages; smaller
/// rates are fractions.
pub fn format_commission(rate: f64) -> String {
    let percent = if rate > 1.0 { rate } else { rate * 100.0 };
    let text = format!("{:.2}", percent);
    let trimmed = text.strip_suffix(".00").unwrap_or(&text);
    format!("{}%", trimmed)
}

/// Parses a commission value. Numbers pass through, strings contribute their
/// first decimal substring. Negative or non-finite values are rejected.
pub fn parse_commission(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => DECIMAL_NUMBER
            .find(text)
            .and_then(|m| m.as_str().parse::<f64>().ok()),
        _ => None,
    }?;
    (parsed.is_finite() && parsed >= 0.0).then_some(parsed)
}

fn from_unix(value: i64) -> Option<DateTime<Utc>> {
    if value > MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    }
}

fn from_naive(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    cst()
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_time_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse::<i64>().ok().and_then(from_unix);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return from_naive(naive);
    }
    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(from_naive)
}

/// Parses a supplier time value. Anything unparsable is treated as absent.
pub fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(number) => match number.as_i64() {
            Some(n) => from_unix(n),
            None => number.as_f64().and_then(|f| from_unix(f.trunc() as i64)),
        },
        Value::String(text) => parse_time_text(text),
        _ => None,
    }
}

fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.with_timezone(&cst()).format("%m/%d %H:%M").to_string()
}

/// Renders the validity window in China Standard Time.
pub fn format_date_range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> String {
    if start.is_none() && end.is_none() {
        return UNKNOWN_VALIDITY.to_string();
    }
    let start_text = start
        .as_ref()
        .map(format_instant)
        .unwrap_or_else(|| OPEN_START.to_string());
    let end_text = end
        .as_ref()
        .map(format_instant)
        .unwrap_or_else(|| OPEN_END.to_string());
    format!("{} - {}", start_text, end_text)
}

pub fn infer_status(
    now: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> ActivityStatus {
    match (start, end) {
        (None, None) => ActivityStatus::Unknown,
        (Some(start), _) if now < start => ActivityStatus::Upcoming,
        (_, Some(end)) if now > end => ActivityStatus::Offline,
        _ => ActivityStatus::Online,
    }
}
