//! Tests-per-FTE throughput.

use crate::models::{Period, ProductivityRecord, TestsPerFte};

/// Sum hours of entries dated inside the period (inclusive).
///
/// Entries without a parseable date are skipped.
pub fn sum_hours(entries: &[ProductivityRecord], period: &Period) -> f64 {
    entries
        .iter()
        .filter(|e| e.day().is_some_and(|d| period.contains_date(d)))
        .map(ProductivityRecord::hours)
        .sum()
}

/// Build the throughput block.
///
/// Without productivity data (absent or empty) the hour-derived fields stay
/// null. `fte_equivalents` is null when no hours were logged or the
/// configured day length is not positive; `value` needs positive FTEs.
pub fn tests_per_fte(
    tests: u64,
    productivity: Option<&[ProductivityRecord]>,
    period: &Period,
    hours_per_fte_day: f64,
) -> TestsPerFte {
    let total_hours = productivity
        .filter(|entries| !entries.is_empty())
        .map(|entries| sum_hours(entries, period));

    let fte_equivalents = total_hours
        .filter(|&hours| hours != 0.0 && hours_per_fte_day > 0.0)
        .map(|hours| hours / hours_per_fte_day);

    let value = fte_equivalents
        .filter(|&fte| fte > 0.0)
        .map(|fte| tests as f64 / fte);

    TestsPerFte {
        tests,
        total_hours,
        fte_equivalents,
        hours_per_fte_day,
        value,
    }
}
