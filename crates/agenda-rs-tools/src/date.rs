//! Date utility: current date, relative phrase resolution, weekday lookup.
//!
//! Everything is computed against a [`Clock`] so callers and tests can pin
//! "today".

use agenda_rs_protocol::ToolError;
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use parking_lot::Mutex;
use thiserror::Error;

/// Canonical date format used in tool arguments, results and metadata.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Canonical clock-time format.
pub const TIME_FORMAT: &str = "%H:%M";

/// Largest relative offset accepted, roughly a century.
const MAX_OFFSET_DAYS: i64 = 36_500;

/// Errors returned by date parsing and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// The expression is not one of the supported phrases.
    #[error("unrecognized date expression: {0:?}")]
    Unrecognized(String),
    /// The value looks like a date but is not a valid calendar day.
    #[error("invalid date {0:?}; expected YYYY-MM-DD")]
    InvalidDate(String),
    /// The value is not a valid `HH:MM` time.
    #[error("invalid time {0:?}; expected HH:MM")]
    InvalidTime(String),
}

impl From<DateError> for ToolError {
    fn from(err: DateError) -> Self {
        ToolError::InvalidArguments(err.to_string())
    }
}

/// Source of the current local date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a settable date.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    /// Move the pinned date.
    pub fn set(&self, today: NaiveDate) {
        *self.today.lock() = today;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock()
    }
}

/// Format a date canonically as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Full English weekday name, e.g. `Tuesday`.
pub fn day_of_week(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// Parse an absolute `YYYY-MM-DD` or `YYYY-MM-DD HH:MM` value.
pub fn parse_date(value: &str) -> Result<NaiveDate, DateError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M") {
        return Ok(stamp.date());
    }
    Err(DateError::InvalidDate(value.to_string()))
}

/// Parse an `HH:MM` (or `HH:MM:SS`) clock time.
pub fn parse_time(value: &str) -> Result<NaiveTime, DateError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| DateError::InvalidTime(value.to_string()))
}

/// Resolve an absolute date or relative phrase against `today`.
///
/// Supported (case-insensitive): `today`, `tomorrow`, `yesterday`,
/// `YYYY-MM-DD`, `YYYY-MM-DD HH:MM`, `<weekday>` and `next <weekday>` (next
/// occurrence after today), `this <weekday>` (today counts), `last <weekday>`,
/// `in N day(s)|week(s)`, `N day(s)|week(s) ago`.
pub fn resolve_date(expression: &str, today: NaiveDate) -> Result<NaiveDate, DateError> {
    let normalized = expression
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let words: Vec<&str> = normalized.split(' ').collect();

    match words.as_slice() {
        ["today"] => return Ok(today),
        ["tomorrow"] => return Ok(today + Duration::days(1)),
        ["yesterday"] => return Ok(today - Duration::days(1)),
        [word] if looks_like_date(word) => return parse_date(word),
        [day, time] if looks_like_date(day) && time.contains(':') => {
            return parse_date(&normalized);
        }
        [name] => {
            if let Some(weekday) = parse_weekday(name) {
                return Ok(next_weekday(today, weekday));
            }
        }
        ["next", name] => {
            if let Some(weekday) = parse_weekday(name) {
                return Ok(next_weekday(today, weekday));
            }
        }
        ["this", name] => {
            if let Some(weekday) = parse_weekday(name) {
                let ahead = days_until(today.weekday(), weekday);
                return Ok(today + Duration::days(ahead));
            }
        }
        ["last", name] => {
            if let Some(weekday) = parse_weekday(name) {
                let mut back = days_until(weekday, today.weekday());
                if back == 0 {
                    back = 7;
                }
                return Ok(today - Duration::days(back));
            }
        }
        ["in", count, unit] => {
            if let Some(days) = span_days(count, unit) {
                return Ok(today + Duration::days(days));
            }
        }
        [count, unit, "ago"] => {
            if let Some(days) = span_days(count, unit) {
                return Ok(today - Duration::days(days));
            }
        }
        _ => {}
    }
    Err(DateError::Unrecognized(expression.trim().to_string()))
}

fn looks_like_date(word: &str) -> bool {
    word.len() >= 8 && word.starts_with(|ch: char| ch.is_ascii_digit()) && word.contains('-')
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    let weekday = match name {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

/// Days from `from` forward to `to`, in `0..7`.
fn days_until(from: Weekday, to: Weekday) -> i64 {
    let from = i64::from(from.num_days_from_monday());
    let to = i64::from(to.num_days_from_monday());
    (to - from).rem_euclid(7)
}

/// First occurrence of `weekday` strictly after `today`.
fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let mut ahead = days_until(today.weekday(), weekday);
    if ahead == 0 {
        ahead = 7;
    }
    today + Duration::days(ahead)
}

fn span_days(count: &str, unit: &str) -> Option<i64> {
    let count: i64 = count.parse().ok()?;
    if !(0..=MAX_OFFSET_DAYS).contains(&count) {
        return None;
    }
    match unit {
        "day" | "days" => Some(count),
        "week" | "weeks" => Some(count * 7),
        _ => None,
    }
}
