//! Command handlers behind the `lab-kpi` binary.

use std::path::PathBuf;

use lab_kpi_core::{compute_with_cache, ConfigCache, ConfigLocator, KpiError, MetricsReport};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::request::{ComputeRequest, RequestError};

/// Exit code for caller-fixable input problems.
pub const EXIT_VALIDATION: u8 = 2;
/// Exit code when the KPI config cannot be loaded.
pub const EXIT_CONFIG: u8 = 3;
/// Exit code for anything else.
pub const EXIT_FAILURE: u8 = 1;

/// Command errors.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Kpi(#[from] KpiError),

    #[error("Failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CommandError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandError::Request(_) => EXIT_VALIDATION,
            CommandError::Kpi(e) if e.is_validation() => EXIT_VALIDATION,
            CommandError::Kpi(_) => EXIT_CONFIG,
            CommandError::Output(_) => EXIT_FAILURE,
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Config cache for a run, with an optional explicit path.
pub fn config_cache(config: Option<PathBuf>) -> ConfigCache {
    match config {
        Some(path) => ConfigCache::new(ConfigLocator::from_env().with_override(path)),
        None => ConfigCache::from_env(),
    }
}

/// Compute a report for one request.
pub fn compute(cache: &ConfigCache, request: &ComputeRequest) -> CommandResult<MetricsReport> {
    let report = compute_with_cache(
        cache,
        &request.period,
        &request.tests,
        request.productivity.as_deref(),
    )?;

    info!(
        tests = request.tests.len(),
        productivity_items = request.productivity_items(),
        "kpi_compute ok"
    );
    Ok(report)
}

/// The loaded config with internal keys removed.
pub fn config_view(cache: &ConfigCache) -> CommandResult<Value> {
    let config = cache.get_or_load().map_err(KpiError::from)?;
    Ok(config.public_view()?)
}

/// Report JSON for stdout.
pub fn render_report(report: &MetricsReport, pretty: bool) -> CommandResult<String> {
    let out = if pretty {
        report.to_json_pretty()?
    } else {
        report.to_json()?
    };
    Ok(out)
}

/// Config view JSON for stdout.
pub fn render_config(view: &Value) -> CommandResult<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging;
    use crate::request::parse_compute_request;
    use lab_kpi_core::Status;
    use std::fs;
    use tempfile::TempDir;

    fn cache_with(yaml: &str) -> (TempDir, ConfigCache) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kpi_config.yaml");
        fs::write(&path, yaml).unwrap();
        let cache = ConfigCache::new(ConfigLocator::new(vec![path]));
        (dir, cache)
    }

    const CONFIG: &str = "\
_source: internal
metadata:
  version: \"2.1\"
kpis:
  cytogenetics_total_volume:
    thresholds:
      warning: 5
      critical: 2
";

    #[test]
    fn test_compute_request() {
        logging::init_test();
        let (_dir, cache) = cache_with(CONFIG);
        let request = parse_compute_request(
            r#"{
                "period": {"start_date": "2025-01-01", "end_date": "2025-01-31"},
                "tests": [
                    {"type": "CYTO", "received_at": "2025-01-05T08:00:00Z", "resulted_at": "2025-01-05T10:00:00Z"},
                    {"type": "PCR", "resulted_at": "2025-01-09T10:00:00Z"}
                ]
            }"#,
        )
        .unwrap();

        let report = compute(&cache, &request).unwrap();
        assert_eq!(report.metrics.total_volume.total, 2);
        assert_eq!(report.metrics.cytogenetics_total_volume.total, 1);
        assert_eq!(report.metrics.cytogenetics_total_volume.status, Status::Critical);
        assert_eq!(report.meta.config_version, Some(Value::from("2.1")));
    }

    #[test]
    fn test_invalid_period_maps_to_validation_exit() {
        let (_dir, cache) = cache_with(CONFIG);
        let request = parse_compute_request(
            r#"{"period": {"start_date": "2025-13-01", "end_date": "2025-01-31"}}"#,
        )
        .unwrap();

        let err = compute(&cache, &request).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_VALIDATION);
    }

    #[test]
    fn test_missing_config_maps_to_config_exit() {
        let cache = ConfigCache::new(ConfigLocator::new(vec![PathBuf::from(
            "/nowhere/kpi_config.yaml",
        )]));
        let request = parse_compute_request(
            r#"{"period": {"start_date": "2025-01-01", "end_date": "2025-01-31"}}"#,
        )
        .unwrap();

        let err = compute(&cache, &request).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG);

        let err = config_view(&cache).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
    }

    #[test]
    fn test_request_errors_map_to_validation_exit() {
        let err: CommandError = parse_compute_request("[]").unwrap_err().into();
        assert_eq!(err.exit_code(), EXIT_VALIDATION);
    }

    #[test]
    fn test_config_view_hides_internal_keys() {
        let (_dir, cache) = cache_with(CONFIG);
        let view = config_view(&cache).unwrap();

        assert!(view.get("_source").is_none());
        assert_eq!(view["metadata"]["version"], "2.1");
        assert_eq!(
            view["kpis"]["cytogenetics_total_volume"]["thresholds"]["warning"],
            5.0
        );
    }

    #[test]
    fn test_render_report() {
        let (_dir, cache) = cache_with(CONFIG);
        let request = parse_compute_request(
            r#"{"period": {"start_date": "2025-01-01", "end_date": "2025-01-31"}}"#,
        )
        .unwrap();
        let report = compute(&cache, &request).unwrap();

        let compact = render_report(&report, false).unwrap();
        let pretty = render_report(&report, true).unwrap();
        assert!(!compact.contains('\n'));
        assert!(pretty.contains('\n'));

        let a: Value = serde_json::from_str(&compact).unwrap();
        let b: Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_config_cache_override() {
        let (dir, _) = cache_with(CONFIG);
        let cache = config_cache(Some(dir.path().join("kpi_config.yaml")));
        assert_eq!(
            cache.get_or_load().unwrap().version(),
            Some(&Value::from("2.1"))
        );

        let cache = config_cache(Some(dir.path().join("missing.yaml")));
        assert_eq!(config_view(&cache).unwrap_err().exit_code(), EXIT_CONFIG);
    }
}
