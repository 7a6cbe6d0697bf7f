use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};
use regex::Regex;

static COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+(?:\.[0-9]+)?)\s*([万亿])?$").unwrap());
static YESTERDAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^昨天\s*(\d{1,2}):(\d{2})").unwrap());
static MONTH_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2})\s+(\d{1,2}):(\d{2})").unwrap());
static FULL_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());

/// Parse a display count such as "12345", "3.5万" or "1.2亿".
///
/// The whole (trimmed) string must be a decimal number with an optional
/// magnitude unit; anything else yields `None`.
pub fn parse_count(raw: Option<&str>) -> Option<i64> {
    let s = raw?.trim();
    let caps = COUNT_RE.captures(s)?;
    let n: f64 = caps[1].parse().ok()?;
    if !n.is_finite() || n < 0.0 {
        return None;
    }
    let scaled = match caps.get(2).map(|m| m.as_str()) {
        None => n,
        Some("万") => n * 1e4,
        Some("亿") => n * 1e8,
        Some(_) => return None,
    };
    let rounded = scaled.round();
    if !rounded.is_finite() || rounded > i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}

/// Best-effort absolute date for a post's display time, relative to when the
/// page was captured. No timezone correction happens here: the calendar date
/// of `reference` in its own zone is taken at face value.
///
/// Returns `YYYY-MM-DD HH:MM` for timed forms, `YYYY-MM-DD` for bare dates,
/// and `None` when the string is in a shape we don't understand.
pub fn guess_created_at_local<Tz: TimeZone>(raw: &str, reference: &DateTime<Tz>) -> Option<String> {
    let s = raw.trim();
    let base = reference.date_naive();

    if let Some(caps) = YESTERDAY_RE.captures(s) {
        let day = base.checked_sub_days(Days::new(1))?;
        let (h, m) = hour_minute(&caps[1], &caps[2])?;
        return Some(format!("{} {:02}:{:02}", day.format("%Y-%m-%d"), h, m));
    }

    if let Some(caps) = MONTH_DAY_RE.captures(s) {
        let day = NaiveDate::from_ymd_opt(base.year(), caps[1].parse().ok()?, caps[2].parse().ok()?)?;
        let (h, m) = hour_minute(&caps[3], &caps[4])?;
        return Some(format!("{} {:02}:{:02}", day.format("%Y-%m-%d"), h, m));
    }

    if let Some(caps) = FULL_DATE_RE.captures(s) {
        let day = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )?;
        return Some(day.format("%Y-%m-%d").to_string());
    }

    None
}

fn hour_minute(h: &str, m: &str) -> Option<(u32, u32)> {
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    (h < 24 && m < 60).then_some((h, m))
}
