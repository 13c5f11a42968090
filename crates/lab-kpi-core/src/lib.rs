//! Lab KPI Core Library
//!
//! Computes operational KPIs for a laboratory testing workflow from raw test
//! records and optional staff-productivity records.
//!
//! # Architecture
//!
//! ```text
//!  kpi_config.yaml ──► ConfigLocator ──► ConfigCache (load once)
//!                                              │
//!                                         Arc<KpiConfig>
//!                                              │
//!  period + tests + productivity ──────► KpiEngine::compute
//!                                              │
//!            ┌──────────────┬─────────────────┼──────────────┬──────────────┐
//!            ▼              ▼                 ▼              ▼              ▼
//!         Volumes      TAT stats        MoM / YoY      Tests per FTE   Breach notices
//!                                              │
//!                                              ▼
//!                                        MetricsReport (JSON)
//! ```
//!
//! # Core Principle
//!
//! **Bad records degrade, they never fail a report.** Only configuration
//! errors and invalid periods surface as errors.
//!
//! # Modules
//!
//! - [`config`]: YAML config model, path resolution, single-slot cache
//! - [`dates`]: Lenient timestamp parsing and calendar month/year shifts
//! - [`models`]: Period, record schemas, report types
//! - [`engine`]: The KPI computation itself

pub mod config;
pub mod dates;
pub mod engine;
pub mod models;

// Re-export commonly used types
pub use config::{
    load_config, ConfigCache, ConfigError, ConfigLocator, KpiConfig, KpiDefinition, Thresholds,
};
pub use engine::{compute_kpis, KpiEngine};
pub use models::{
    MetricsReport, Period, PeriodError, PeriodInput, ProductivityRecord, Status, TestCategory,
    TestRecord,
};

use thiserror::Error;

/// Errors surfaced to callers of the KPI core.
///
/// Configuration failures and validation failures stay distinct so outer
/// layers can map them to different outward codes.
#[derive(Error, Debug)]
pub enum KpiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid period: {0}")]
    Validation(#[from] PeriodError),
}

impl KpiError {
    /// Whether the caller can fix this by changing its input.
    pub fn is_validation(&self) -> bool {
        matches!(self, KpiError::Validation(_))
    }
}

pub type KpiResult<T> = Result<T, KpiError>;

/// Load the config through a cache and compute a report.
pub fn compute_with_cache(
    cache: &ConfigCache,
    period: &PeriodInput,
    tests: &[TestRecord],
    productivity: Option<&[ProductivityRecord]>,
) -> KpiResult<MetricsReport> {
    let config = cache.get_or_load()?;
    Ok(compute_kpis(&config, period, tests, productivity)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_classification() {
        let validation: KpiError = PeriodError::InvalidDate {
            field: "start_date",
            value: "x".into(),
        }
        .into();
        assert!(validation.is_validation());

        let config: KpiError = ConfigError::NotFound {
            path: PathBuf::from("/nowhere/kpi_config.yaml"),
        }
        .into();
        assert!(!config.is_validation());
        assert!(config.to_string().contains("/nowhere/kpi_config.yaml"));
    }

    #[test]
    fn test_compute_with_missing_config() {
        let cache = ConfigCache::new(ConfigLocator::new(vec![PathBuf::from(
            "/nowhere/kpi_config.yaml",
        )]));
        let err = compute_with_cache(
            &cache,
            &PeriodInput::new("2025-01-01", "2025-01-31"),
            &[],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, KpiError::Config(ConfigError::NotFound { .. })));
    }
}
