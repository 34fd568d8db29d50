//! Date and time normalization for loosely formatted booking input.
//!
//! Booking requests arrive from a public page and from a chat bot, so dates
//! and times show up as `25/12/2025`, `amanhã`, `9h30`, `14:00:00` and so on.
//! Everything here converges on two canonical shapes: `YYYY-MM-DD` for dates
//! and `HH:MM` for times. Parsing is permissive: unknown dates resolve to
//! "today" and unknown times are handed back untouched for the caller to
//! reject.

use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

static ISO_DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("ISO_DATE_REGEX pattern is valid")
});

/// 25/12/2025, 25-12-2025, 5/1/2026
static DAY_FIRST_DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$")
        .expect("DAY_FIRST_DATE_REGEX pattern is valid")
});

/// 9:30, 09:30, 09:30:00
static CLOCK_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("CLOCK_TIME_REGEX pattern is valid")
});

/// 9h, 9h30, 18h, 18H
static COLLOQUIAL_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})\s*[hH](\d{2})?$").expect("COLLOQUIAL_TIME_REGEX pattern is valid")
});

/// Normalize a free-form date token to `YYYY-MM-DD`.
///
/// Unrecognized input resolves to `today`.
pub fn normalize_date(input: &str, today: NaiveDate) -> String {
    try_normalize_date(input, today).unwrap_or(today).format(CANONICAL_DATE_FORMAT).to_string()
}

/// Recognize a free-form date token without the "today" fallback.
pub fn try_normalize_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let token = input.trim().to_lowercase();

    match token.as_str() {
        "today" | "hoje" => return Some(today),
        "tomorrow" | "amanhã" | "amanha" => return today.checked_add_days(Days::new(1)),
        _ => {}
    }

    if let Some(caps) = ISO_DATE_REGEX.captures(&token) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = DAY_FIRST_DATE_REGEX.captures(&token) {
        return ymd(&caps[3], &caps[2], &caps[1]);
    }

    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Parse a canonical `YYYY-MM-DD` date.
pub fn parse_canonical_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), CANONICAL_DATE_FORMAT).ok()
}

/// Normalize a free-form time token to `HH:MM`.
///
/// Anything that is not recognized (or is out of range) is returned exactly
/// as given; use [`is_canonical_time`] to tell the two apart.
pub fn normalize_time(input: &str) -> String {
    let token = input.trim();

    let parts = CLOCK_TIME_REGEX
        .captures(token)
        .or_else(|| COLLOQUIAL_TIME_REGEX.captures(token))
        .and_then(|caps| {
            let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
            let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
            (hour < 24 && minute < 60).then_some((hour, minute))
        });

    match parts {
        Some((hour, minute)) => format!("{hour:02}:{minute:02}"),
        None => input.to_string(),
    }
}

/// Minutes since midnight for `HH:MM` or `HH:MM:SS`.
pub fn time_to_minutes(input: &str) -> Option<u32> {
    let caps = CLOCK_TIME_REGEX.captures(input.trim())?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    if hour >= 24 || minute >= 60 {
        return None;
    }
    Some(hour * 60 + minute)
}

/// Format minutes since midnight as `HH:MM`.
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Whether `input` is already in the canonical `HH:MM` shape.
pub fn is_canonical_time(input: &str) -> bool {
    input.len() == 5 && input.as_bytes()[2] == b':' && time_to_minutes(input).is_some()
}
