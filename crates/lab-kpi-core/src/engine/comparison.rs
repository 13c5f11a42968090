//! Month-over-month and year-over-year volume deltas.
//!
//! Comparison windows are derived from the reporting period boundaries and
//! counted over the full supplied record list, not the in-period subset.
//! Callers must therefore pass records reaching back into the previous
//! month/year for these deltas to be meaningful.

use crate::models::{PercentChange, Period, TestRecord, TimeWindow};

/// Count records whose effective timestamp falls inside a window.
pub fn count_in_window(tests: &[TestRecord], window: &TimeWindow) -> u64 {
    tests.iter().filter(|t| t.is_within(window)).count() as u64
}

/// Percent change from `previous` to `current`; `None` when there is no prior data.
pub fn percent_change(current: u64, previous: u64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((current as f64 - previous as f64) * 100.0 / previous as f64)
}

/// MoM/YoY deltas for a current-period volume.
pub fn period_over_period(tests: &[TestRecord], period: &Period, current: u64) -> PercentChange {
    let delta = |previous: Option<Period>| {
        let window = previous?.window();
        percent_change(current, count_in_window(tests, &window))
    };

    PercentChange {
        mom: delta(period.previous_month()),
        yoy: delta(period.previous_year()),
    }
}
