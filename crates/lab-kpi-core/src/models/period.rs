//! Reporting period models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates;

/// Period validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid {field}: '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("end_date must be on/after start_date (start_date={start}, end_date={end})")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

pub type PeriodResult<T> = Result<T, PeriodError>;

/// Period exactly as supplied by a caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodInput {
    /// Inclusive first day (YYYY-MM-DD)
    pub start_date: String,
    /// Inclusive last day (YYYY-MM-DD)
    pub end_date: String,
}

impl PeriodInput {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }
}

impl TryFrom<&PeriodInput> for Period {
    type Error = PeriodError;

    fn try_from(input: &PeriodInput) -> PeriodResult<Self> {
        Period::parse(&input.start_date, &input.end_date)
    }
}

/// A validated reporting period `[start_date, end_date]`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

/// Inclusive timestamp range `[start 00:00:00, end 23:59:59]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Check if a timestamp falls inside the window (both ends inclusive).
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

impl Period {
    /// Build a period from calendar dates, rejecting `end < start`.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> PeriodResult<Self> {
        if end_date < start_date {
            return Err(PeriodError::EndBeforeStart {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Parse a period from two `YYYY-MM-DD` strings.
    pub fn parse(start_date: &str, end_date: &str) -> PeriodResult<Self> {
        let start = parse_period_date("start_date", start_date)?;
        let end = parse_period_date("end_date", end_date)?;
        Self::new(start, end)
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Expand to the inclusive timestamp range used for record comparison.
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: dates::start_of_day(self.start_date),
            end: dates::end_of_day(self.end_date),
        }
    }

    /// Check if a calendar date falls inside the period.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Both boundaries shifted back one calendar month (day clamped to month end).
    pub fn previous_month(&self) -> Option<Period> {
        self.shifted(|d| dates::shift_months(d, -1))
    }

    /// Both boundaries shifted back one calendar year.
    pub fn previous_year(&self) -> Option<Period> {
        self.shifted(|d| dates::shift_years(d, -1))
    }

    fn shifted(&self, shift: impl Fn(NaiveDate) -> Option<NaiveDate>) -> Option<Period> {
        // Month shifts are monotonic, so the shifted pair stays ordered.
        Some(Period {
            start_date: shift(self.start_date)?,
            end_date: shift(self.end_date)?,
        })
    }

    /// Echo the period back in caller form.
    pub fn to_input(&self) -> PeriodInput {
        PeriodInput::new(
            self.start_date.format(dates::DATE_FORMAT).to_string(),
            self.end_date.format(dates::DATE_FORMAT).to_string(),
        )
    }
}

fn parse_period_date(field: &'static str, value: &str) -> PeriodResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), dates::DATE_FORMAT).map_err(|_| {
        PeriodError::InvalidDate {
            field,
            value: value.to_string(),
        }
    })
}
