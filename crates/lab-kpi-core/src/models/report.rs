//! Metrics report models.
//!
//! Field names are part of the external contract and serialize exactly as
//! consumers expect (`meta.generatedAt`, `metrics.tat.avg_hours`, ...).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PeriodInput;

/// Threshold-derived status of a metric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// Whether this status should raise an operational notice.
    pub fn is_breach(&self) -> bool {
        matches!(self, Status::Warning | Status::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Warning => "warning",
            Status::Critical => "critical",
            Status::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full KPI report for one period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsReport {
    pub meta: ReportMeta,
    pub metrics: Metrics,
}

impl MetricsReport {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Export to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMeta {
    /// Period echoed back as YYYY-MM-DD
    pub period: PeriodInput,
    /// Generation timestamp (RFC 3339, UTC)
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
    /// `metadata.version` from the config, verbatim
    pub config_version: Option<Value>,
}

/// All computed metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metrics {
    pub cytogenetics_total_volume: VolumeMetric,
    pub total_volume: TotalVolume,
    pub tat: TatMetric,
    pub percent_change: PercentChange,
    pub tests_per_fte: TestsPerFte,
}

/// Category-specific volume with status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolumeMetric {
    pub total: u64,
    pub status: Status,
}

/// Volume across all categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TotalVolume {
    pub total: u64,
}

/// Turnaround-time aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TatMetric {
    pub count: u64,
    pub min_hours: Option<f64>,
    pub max_hours: Option<f64>,
    pub avg_hours: Option<f64>,
    pub status: Status,
}

/// Period-over-period change in total volume (percent). `None` means no prior data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PercentChange {
    pub mom: Option<f64>,
    pub yoy: Option<f64>,
}

/// Throughput per full-time equivalent. Informational only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestsPerFte {
    pub tests: u64,
    pub total_hours: Option<f64>,
    pub fte_equivalents: Option<f64>,
    pub hours_per_fte_day: f64,
    pub value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&Status::Critical).unwrap(), "\"critical\"");
        assert_eq!(serde_json::to_string(&Status::Unknown).unwrap(), "\"unknown\"");
        assert_eq!(Status::Warning.to_string(), "warning");
    }

    #[test]
    fn test_status_breach() {
        assert!(Status::Warning.is_breach());
        assert!(Status::Critical.is_breach());
        assert!(!Status::Ok.is_breach());
        assert!(!Status::Unknown.is_breach());
    }

    #[test]
    fn test_report_field_names() {
        let report = MetricsReport {
            meta: ReportMeta {
                period: PeriodInput::new("2025-01-01", "2025-01-31"),
                generated_at: "2025-02-01T00:00:00.000000Z".into(),
                config_version: Some(Value::from("1.2")),
            },
            metrics: Metrics {
                cytogenetics_total_volume: VolumeMetric {
                    total: 3,
                    status: Status::Ok,
                },
                total_volume: TotalVolume { total: 5 },
                tat: TatMetric {
                    count: 0,
                    min_hours: None,
                    max_hours: None,
                    avg_hours: None,
                    status: Status::Unknown,
                },
                percent_change: PercentChange {
                    mom: None,
                    yoy: Some(25.0),
                },
                tests_per_fte: TestsPerFte {
                    tests: 5,
                    total_hours: None,
                    fte_equivalents: None,
                    hours_per_fte_day: 8.0,
                    value: None,
                },
            },
        };

        let json: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["meta"]["generatedAt"], "2025-02-01T00:00:00.000000Z");
        assert_eq!(json["meta"]["period"]["start_date"], "2025-01-01");
        assert_eq!(json["meta"]["config_version"], "1.2");
        assert_eq!(json["metrics"]["cytogenetics_total_volume"]["status"], "ok");
        assert_eq!(json["metrics"]["tat"]["avg_hours"], Value::Null);
        assert_eq!(json["metrics"]["percent_change"]["mom"], Value::Null);
        assert_eq!(json["metrics"]["percent_change"]["yoy"], 25.0);
        assert_eq!(json["metrics"]["tests_per_fte"]["hours_per_fte_day"], 8.0);
    }
}
