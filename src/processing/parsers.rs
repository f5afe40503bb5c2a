use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::models::ClockTime;

static CURRENCY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)₹|\brs\.?|\binr\b").expect("valid currency token pattern"));

static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.\-]").expect("valid numeric strip pattern"));

static DURATION_PART: LazyLock<Regex> = LazyLock::new(|| {
    // Longest alternatives first: the regex crate picks the first that matches.
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(hours|hour|hrs|hr|h|minutes|minute|mins|min|m|seconds|second|secs|sec|s)")
        .expect("valid duration pattern")
});

static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\.\d+)?\s*(am|pm)?")
        .expect("valid clock pattern")
});

/// Parses a trade date. Slash, dot and dash separated dates are read
/// day-first (`15/1/2025` is 15 January); a four-digit leading group is read
/// as ISO `YYYY-MM-DD`. Timestamps are truncated to their date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // Drop any trailing time component ("15/01/2025 09:30").
    let date_part = s.split_whitespace().next()?;
    let parts: Vec<&str> = date_part.split(['/', '-', '.']).collect();
    if parts.len() != 3 {
        return None;
    }

    let nums: Vec<i32> = parts
        .iter()
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<_, _>>()
        .ok()?;

    if parts[0].trim().len() == 4 {
        return NaiveDate::from_ymd_opt(nums[0], nums[1] as u32, nums[2] as u32);
    }

    let year = if parts[2].trim().len() == 2 {
        2000 + nums[2]
    } else {
        nums[2]
    };
    if nums[0] < 1 || nums[1] < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, nums[1] as u32, nums[0] as u32)
}

/// Parses a wall-clock time such as `09:30`, `9:30:15` or `2:05 PM`, also when
/// it trails a date. Returns `None` for anything it cannot read.
pub fn parse_time(raw: &str) -> Option<ClockTime> {
    let caps = CLOCK.captures(raw.trim())?;
    let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(2)?.as_str().parse().ok()?;
    let second: u32 = caps
        .get(3)
        .map_or(Some(0), |m| m.as_str().parse().ok())?;

    if let Some(meridiem) = caps.get(4) {
        let pm = meridiem.as_str().eq_ignore_ascii_case("pm");
        if hour == 0 || hour > 12 {
            return None;
        }
        hour = match (pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
    }

    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    Some(ClockTime::new(hour, minute, second))
}

/// Strips currency markers (`₹`, `Rs.`, `INR`), thousands separators and
/// whitespace, e.g. `"₹1,500.50"` becomes `1500.5`. Amounts in parentheses
/// are negative.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let negative_parens = s.starts_with('(') && s.ends_with(')');
    let without_token = CURRENCY_TOKEN.replace_all(s, "");
    let cleaned = NON_NUMERIC.replace_all(&without_token, "");
    if cleaned.is_empty() || cleaned == "-" || cleaned == "." {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative_parens { -value.abs() } else { value })
}

/// Numeric JSON value or currency-formatted string.
pub fn parse_number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_currency(s),
        _ => None,
    }
}

/// Parses a holding duration into whole seconds. Accepts unit groups in any
/// combination (`"1h 15m 30s"`, `"5m"`, `"45 sec"`), `HH:MM:SS` / `MM:SS`
/// clocks, and bare numbers of seconds. Missing unit groups contribute zero.
pub fn parse_duration(raw: &str) -> u64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0;
    }

    if let Ok(seconds) = s.parse::<f64>() {
        return if seconds.is_finite() && seconds > 0.0 {
            seconds.round() as u64
        } else {
            0
        };
    }

    if s.contains(':') && !s.chars().any(|c| c.is_ascii_alphabetic()) {
        let parts: Option<Vec<u64>> = s.split(':').map(|p| p.trim().parse().ok()).collect();
        return match parts.as_deref() {
            Some(&[h, m, sec]) if m < 60 && sec < 60 => clock_seconds(h, m, sec),
            Some(&[m, sec]) if sec < 60 => clock_seconds(0, m, sec),
            _ => 0,
        };
    }

    let mut total = 0.0;
    for caps in DURATION_PART.captures_iter(s) {
        let amount: f64 = caps[1].parse().unwrap_or(0.0);
        let unit = caps[2].to_lowercase();
        let multiplier = match unit.chars().next() {
            Some('h') => 3600.0,
            Some('m') => 60.0,
            _ => 1.0,
        };
        total += amount * multiplier;
    }
    total.round() as u64
}

/// Overflowing clock values are unreadable, not huge.
fn clock_seconds(hours: u64, minutes: u64, seconds: u64) -> u64 {
    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .unwrap_or(0)
}

pub fn parse_duration_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite() && *v > 0.0)
            .map_or(0, |v| v.round() as u64),
        Value::String(s) => parse_duration(s),
        _ => 0,
    }
}
