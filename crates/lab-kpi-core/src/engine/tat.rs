//! Turnaround-time aggregation.

use crate::config::Thresholds;
use crate::models::{Status, TatMetric};

use super::threshold::{self, Polarity};

/// Running min/max/mean over turnaround samples (hours).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TatStats {
    count: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl TatStats {
    /// Aggregate a sequence of samples.
    pub fn from_samples(samples: impl IntoIterator<Item = f64>) -> Self {
        let mut stats = Self::default();
        for hours in samples {
            stats.push(hours);
        }
        stats
    }

    /// Add one sample.
    pub fn push(&mut self, hours: f64) {
        self.count += 1;
        self.sum += hours;
        self.min = Some(self.min.map_or(hours, |m| m.min(hours)));
        self.max = Some(self.max.map_or(hours, |m| m.max(hours)));
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Arithmetic mean, kept within `[min, max]` despite rounding.
    pub fn mean(&self) -> Option<f64> {
        let (min, max) = (self.min?, self.max?);
        Some((self.sum / self.count as f64).clamp(min, max))
    }

    /// Report block with status; `unknown` when there are no samples.
    pub fn into_metric(self, thresholds: Option<&Thresholds>) -> TatMetric {
        let avg_hours = self.mean();
        let status = match avg_hours {
            Some(avg) => threshold::evaluate(avg, thresholds, Polarity::HigherIsWorse),
            None => Status::Unknown,
        };

        TatMetric {
            count: self.count,
            min_hours: self.min,
            max_hours: self.max,
            avg_hours,
            status,
        }
    }
}
