//! KPI engine.
//!
//! Pipeline: Period → Windowing → Volume/TAT → Thresholds → Deltas → Throughput → Report
//!
//! The engine is a pure, synchronous pass over the supplied records. It holds
//! only a shared reference to the config, so any number of computations can
//! run in parallel against one cached config.

mod alerts;
mod comparison;
mod tat;
mod threshold;
mod throughput;

pub use alerts::*;
pub use comparison::*;
pub use tat::*;
pub use threshold::*;
pub use throughput::*;

use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::config::{KpiConfig, CYTO_VOLUME_KPI, TAT_KPI};
use crate::models::{
    Metrics, MetricsReport, Period, PeriodInput, PeriodResult, ProductivityRecord, ReportMeta,
    TestCategory, TestRecord, TotalVolume, VolumeMetric,
};

/// Computes metrics reports against one configuration.
#[derive(Debug, Clone, Copy)]
pub struct KpiEngine<'a> {
    config: &'a KpiConfig,
}

impl<'a> KpiEngine<'a> {
    /// Create an engine over a loaded config.
    pub fn new(config: &'a KpiConfig) -> Self {
        Self { config }
    }

    /// Compute the full report and emit breach notices.
    pub fn compute(
        &self,
        period: &Period,
        tests: &[TestRecord],
        productivity: Option<&[ProductivityRecord]>,
    ) -> MetricsReport {
        let metrics = self.compute_metrics(period, tests, productivity);

        let report = MetricsReport {
            meta: ReportMeta {
                period: period.to_input(),
                generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
                config_version: self.config.version().cloned(),
            },
            metrics,
        };

        emit_breach_notices(&report);
        report
    }

    /// Compute the `metrics` block only. Deterministic for identical inputs.
    pub fn compute_metrics(
        &self,
        period: &Period,
        tests: &[TestRecord],
        productivity: Option<&[ProductivityRecord]>,
    ) -> Metrics {
        let window = period.window();

        // Records without a parseable timestamp drop out here
        let in_period: Vec<&TestRecord> = tests.iter().filter(|t| t.is_within(&window)).collect();

        let total_volume = in_period.len() as u64;
        let cyto_volume = in_period
            .iter()
            .filter(|t| t.category() == TestCategory::Cyto)
            .count() as u64;

        let tat = TatStats::from_samples(in_period.iter().filter_map(|t| t.tat_hours()))
            .into_metric(self.config.thresholds(TAT_KPI));

        let cyto_status = evaluate(
            cyto_volume as f64,
            self.config.thresholds(CYTO_VOLUME_KPI),
            Polarity::LowerIsWorse,
        );

        debug!(
            records = tests.len(),
            in_period = total_volume,
            cyto = cyto_volume,
            tat_samples = tat.count,
            "Windowed test records"
        );

        Metrics {
            cytogenetics_total_volume: VolumeMetric {
                total: cyto_volume,
                status: cyto_status,
            },
            total_volume: TotalVolume {
                total: total_volume,
            },
            tat,
            percent_change: period_over_period(tests, period, total_volume),
            tests_per_fte: tests_per_fte(
                total_volume,
                productivity,
                period,
                self.config.hours_per_fte_day(),
            ),
        }
    }
}

/// Validate a caller-supplied period and compute the report.
///
/// Fails only when the period is invalid; malformed records and missing
/// config sections degrade instead of failing.
pub fn compute_kpis(
    config: &KpiConfig,
    period: &PeriodInput,
    tests: &[TestRecord],
    productivity: Option<&[ProductivityRecord]>,
) -> PeriodResult<MetricsReport> {
    let period = Period::try_from(period)?;
    Ok(KpiEngine::new(config).compute(&period, tests, productivity))
}
