//! Input record schemas.
//!
//! Records arrive from spreadsheets and ad-hoc exports, so every field is
//! optional and read leniently: strings, numbers and booleans are kept as
//! text, anything else is treated as absent. Unknown fields are ignored.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::TimeWindow;
use crate::dates;

/// Category labels counted as cytogenetics work.
const CYTO_LABELS: &[&str] = &["CYTO", "CYTOGENETICS", "KARYOTYPE"];

const SECONDS_PER_HOUR: f64 = 3600.0;
const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Test category used by the category-specific volume metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestCategory {
    Cyto,
    Other,
}

impl TestCategory {
    /// Classify a free-text type/category label (case-insensitive).
    pub fn classify(label: &str) -> Self {
        let upper = label.trim().to_uppercase();
        if CYTO_LABELS.contains(&upper.as_str()) {
            TestCategory::Cyto
        } else {
            TestCategory::Other
        }
    }
}

/// A single laboratory test record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TestRecord {
    /// Free-text test type (preferred over `category`)
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    pub test_type: Option<String>,
    /// Free-text category, used when `type` is absent or empty
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    /// Specimen received in the lab
    #[serde(default, deserialize_with = "lenient_text")]
    pub received_at: Option<String>,
    /// Specimen collected (start fallback)
    #[serde(default, deserialize_with = "lenient_text")]
    pub collected_at: Option<String>,
    /// Result available
    #[serde(default, deserialize_with = "lenient_text")]
    pub resulted_at: Option<String>,
    /// Report signed out (end fallback)
    #[serde(default, deserialize_with = "lenient_text")]
    pub signed_out_at: Option<String>,
}

impl TestRecord {
    /// Create a record with only a type label.
    pub fn new(test_type: impl Into<String>) -> Self {
        Self {
            test_type: Some(test_type.into()),
            ..Default::default()
        }
    }

    /// Builder-style setter for `received_at`.
    pub fn received(mut self, ts: impl Into<String>) -> Self {
        self.received_at = Some(ts.into());
        self
    }

    /// Builder-style setter for `resulted_at`.
    pub fn resulted(mut self, ts: impl Into<String>) -> Self {
        self.resulted_at = Some(ts.into());
        self
    }

    /// Category from the first non-empty of `type`, `category`.
    pub fn category(&self) -> TestCategory {
        let label = first_non_empty(&[&self.test_type, &self.category]).unwrap_or("");
        TestCategory::classify(label)
    }

    /// Start of processing: first parseable of `received_at`, `collected_at`.
    pub fn started_at(&self) -> Option<NaiveDateTime> {
        first_parseable(&[&self.received_at, &self.collected_at])
    }

    /// End of processing: first parseable of `resulted_at`, `signed_out_at`.
    pub fn ended_at(&self) -> Option<NaiveDateTime> {
        first_parseable(&[&self.resulted_at, &self.signed_out_at])
    }

    /// Timestamp used for period windowing.
    ///
    /// `resulted_at` when parseable, otherwise the start chain. `signed_out_at`
    /// only feeds turnaround time, never windowing.
    pub fn effective_timestamp(&self) -> Option<NaiveDateTime> {
        first_parseable(&[&self.resulted_at]).or_else(|| self.started_at())
    }

    /// Whether the effective timestamp is known and inside the window.
    pub fn is_within(&self, window: &TimeWindow) -> bool {
        self.effective_timestamp().is_some_and(|ts| window.contains(ts))
    }

    /// Turnaround time in hours, when both ends are known and ordered.
    pub fn tat_hours(&self) -> Option<f64> {
        let start = self.started_at()?;
        let end = self.ended_at()?;
        if end < start {
            return None;
        }
        let elapsed = end - start;
        let seconds = match elapsed.num_microseconds() {
            Some(us) => us as f64 / MICROS_PER_SECOND,
            None => elapsed.num_milliseconds() as f64 / 1000.0,
        };
        Some(seconds / SECONDS_PER_HOUR)
    }
}

/// A staff productivity entry for one day.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductivityRecord {
    /// Calendar date the hours belong to
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    /// Explicit hours worked (takes precedence when present and non-empty)
    #[serde(default, deserialize_with = "lenient_text")]
    pub hours_worked: Option<String>,
    /// Remote hours (summed with in-lab hours)
    #[serde(default, deserialize_with = "lenient_text")]
    pub remote_hours: Option<String>,
    /// In-lab hours (summed with remote hours)
    #[serde(default, deserialize_with = "lenient_text")]
    pub in_lab_hours: Option<String>,
    /// Total hours (last resort)
    #[serde(default, deserialize_with = "lenient_text")]
    pub total_hours: Option<String>,
}

impl ProductivityRecord {
    /// Create an entry with a date and explicit hours worked.
    pub fn worked(date: impl Into<String>, hours: f64) -> Self {
        Self {
            date: Some(date.into()),
            hours_worked: Some(hours.to_string()),
            ..Default::default()
        }
    }

    /// Calendar date of the entry, if parseable.
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(dates::parse_calendar_date)
    }

    /// Hours for this entry.
    ///
    /// Precedence: `hours_worked` if present and non-empty (even when it fails
    /// to parse, in which case it counts as zero); else `remote_hours +
    /// in_lab_hours` if either is non-zero; else `total_hours`; else zero.
    pub fn hours(&self) -> f64 {
        if let Some(worked) = self.hours_worked.as_deref().filter(|s| !s.is_empty()) {
            return parse_hours(Some(worked));
        }

        let remote = parse_hours(self.remote_hours.as_deref());
        let in_lab = parse_hours(self.in_lab_hours.as_deref());
        if remote != 0.0 || in_lab != 0.0 {
            return remote + in_lab;
        }

        parse_hours(self.total_hours.as_deref())
    }
}

/// Parse an hours field, falling back to zero.
pub fn parse_hours(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|h| h.is_finite())
        .unwrap_or(0.0)
}

fn first_non_empty<'a>(fields: &[&'a Option<String>]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|&f| f.as_deref())
        .find(|s| !s.is_empty())
}

fn first_parseable(fields: &[&Option<String>]) -> Option<NaiveDateTime> {
    fields
        .iter()
        .filter_map(|&f| f.as_deref())
        .find_map(dates::parse_timestamp)
}

/// Accept strings, numbers and booleans as text; everything else is absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
