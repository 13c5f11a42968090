//! Calendar helpers shared by the period model and the engine.
//!
//! Handles:
//! - Lenient timestamp parsing for ISO-8601-like record fields
//! - Calendar-aware month/year shifting with end-of-month clamping

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Naive (offset-free) layouts tried after the `T` separator is normalized.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", HOUR_MINUTE_FORMAT];

const HOUR_MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Layouts carrying a numeric UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
];

const LAST_SECOND_OF_DAY: i64 = 23 * 3600 + 59 * 60 + 59;

/// Strict layout for caller-supplied calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a free-form timestamp into a naive UTC date-time.
///
/// Accepts `YYYY-MM-DD[T| ]HH[:MM[:SS[.fff]]]` with an optional trailing `Z`
/// or numeric offset, as well as a bare date (read as midnight). Offsets are
/// normalized to UTC. Returns `None` for anything else; never fails.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = if trimmed.contains('T') {
        trimmed.to_string()
    } else {
        trimmed.replacen(' ', "T", 1)
    };

    if let Some(utc) = normalized
        .strip_suffix('Z')
        .or_else(|| normalized.strip_suffix('z'))
    {
        return parse_naive(utc);
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt.naive_utc());
        }
    }

    parse_naive(&normalized)
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    // chrono needs minutes; `YYYY-MM-DDTHH` means the top of that hour
    if let Some((_, hour)) = s.split_once('T') {
        if hour.len() == 2 && hour.bytes().all(|b| b.is_ascii_digit()) {
            return NaiveDateTime::parse_from_str(&format!("{s}:00"), HOUR_MINUTE_FORMAT).ok();
        }
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .map(start_of_day)
}

/// Parse a calendar date, accepting a full timestamp and keeping its date part.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|dt| dt.date())
}

/// Shift a date by whole calendar months.
///
/// The day of month is clamped to the last valid day of the target month,
/// so 2024-03-31 shifted back one month lands on 2024-02-29.
/// Returns `None` only when the result leaves chrono's representable range.
pub fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let delta = Months::new(months.unsigned_abs());
    if months >= 0 {
        date.checked_add_months(delta)
    } else {
        date.checked_sub_months(delta)
    }
}

/// Shift a date by whole calendar years (Feb 29 clamps to Feb 28 when needed).
pub fn shift_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    shift_months(date, years.checked_mul(12)?)
}

/// Start of day (00:00:00) for a calendar date.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Last whole second (23:59:59) of a calendar date.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::seconds(LAST_SECOND_OF_DAY)
}
