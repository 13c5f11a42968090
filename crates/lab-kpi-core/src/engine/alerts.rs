//! Threshold-breach notices for operational alerting.
//!
//! Notices carry metric values and the period only, never record contents.

use std::panic::{self, AssertUnwindSafe};

use tracing::{error, warn};

use crate::config::{CYTO_VOLUME_KPI, TAT_KPI};
use crate::models::{MetricsReport, Status};

/// Emit a warning/error event for every breaching status in the report.
///
/// Best-effort: a panicking subscriber is swallowed so the computation that
/// produced the report still succeeds.
pub fn emit_breach_notices(report: &MetricsReport) {
    let _ = panic::catch_unwind(AssertUnwindSafe(|| notify(report)));
}

fn notify(report: &MetricsReport) {
    let period = &report.meta.period;
    let metrics = &report.metrics;

    let volume = &metrics.cytogenetics_total_volume;
    if volume.status.is_breach() {
        if volume.status == Status::Critical {
            error!(
                metric = CYTO_VOLUME_KPI,
                status = %volume.status,
                total = volume.total,
                period_start = %period.start_date,
                period_end = %period.end_date,
                "KPI threshold breached"
            );
        } else {
            warn!(
                metric = CYTO_VOLUME_KPI,
                status = %volume.status,
                total = volume.total,
                period_start = %period.start_date,
                period_end = %period.end_date,
                "KPI threshold breached"
            );
        }
    }

    let tat = &metrics.tat;
    if tat.status.is_breach() {
        if tat.status == Status::Critical {
            error!(
                metric = TAT_KPI,
                status = %tat.status,
                avg_hours = ?tat.avg_hours,
                count = tat.count,
                period_start = %period.start_date,
                period_end = %period.end_date,
                "KPI threshold breached"
            );
        } else {
            warn!(
                metric = TAT_KPI,
                status = %tat.status,
                avg_hours = ?tat.avg_hours,
                count = tat.count,
                period_start = %period.start_date,
                period_end = %period.end_date,
                "KPI threshold breached"
            );
        }
    }
}
