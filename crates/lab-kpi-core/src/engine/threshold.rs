//! Threshold evaluation shared by all status-bearing KPIs.

use crate::config::Thresholds;
use crate::models::Status;

/// Which direction of a metric is bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Volume-style metrics: shrinking values breach.
    LowerIsWorse,
    /// Cost-style metrics (turnaround time): growing values breach.
    HigherIsWorse,
}

impl Polarity {
    /// Inclusive breach check against one bound.
    fn breaches(self, value: f64, bound: f64) -> bool {
        match self {
            Polarity::LowerIsWorse => value <= bound,
            Polarity::HigherIsWorse => value >= bound,
        }
    }
}

/// Classify a value against optional bounds.
///
/// `critical` is checked before `warning`. A missing bound skips that check;
/// missing thresholds altogether always yield `ok`.
pub fn evaluate(value: f64, thresholds: Option<&Thresholds>, polarity: Polarity) -> Status {
    let Some(thresholds) = thresholds else {
        return Status::Ok;
    };

    if thresholds
        .critical
        .is_some_and(|bound| polarity.breaches(value, bound))
    {
        Status::Critical
    } else if thresholds
        .warning
        .is_some_and(|bound| polarity.breaches(value, bound))
    {
        Status::Warning
    } else {
        Status::Ok
    }
}
