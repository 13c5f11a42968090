//! Breach notice tests.
//!
//! Uses a minimal in-process subscriber to observe the events the engine
//! emits, and a panicking one to check notices can never fail a computation.

use std::sync::{Arc, Mutex};

use lab_kpi_core::config::{CYTO_VOLUME_KPI, TAT_KPI};
use lab_kpi_core::models::{Period, TestRecord};
use lab_kpi_core::{KpiConfig, KpiEngine, Status};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Metadata, Subscriber};

#[derive(Debug, Clone, PartialEq)]
struct Notice {
    level: Level,
    metric: String,
    status: String,
}

#[derive(Default)]
struct NoticeVisitor {
    metric: Option<String>,
    status: Option<String>,
}

impl Visit for NoticeVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "metric" {
            self.metric = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "status" {
            self.status = Some(format!("{:?}", value));
        }
    }
}

/// Collects breach notices; ignores everything else.
struct Recorder {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl Subscriber for Recorder {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _: &Id, _: &Record<'_>) {}

    fn record_follows_from(&self, _: &Id, _: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut visitor = NoticeVisitor::default();
        event.record(&mut visitor);
        if let (Some(metric), Some(status)) = (visitor.metric, visitor.status) {
            self.notices.lock().unwrap().push(Notice {
                level: *event.metadata().level(),
                metric,
                status,
            });
        }
    }

    fn enter(&self, _: &Id) {}

    fn exit(&self, _: &Id) {}
}

/// Panics on every warn or error event.
struct Exploding;

impl Subscriber for Exploding {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _: &Id, _: &Record<'_>) {}

    fn record_follows_from(&self, _: &Id, _: &Id) {}

    fn event(&self, event: &Event<'_>) {
        if *event.metadata().level() <= Level::WARN {
            panic!("subscriber failure");
        }
    }

    fn enter(&self, _: &Id) {}

    fn exit(&self, _: &Id) {}
}

const BREACHING_CONFIG: &str = "\
kpis:
  cytogenetics_total_volume:
    thresholds:
      warning: 10
      critical: 0
  tat:
    thresholds:
      warning: 1
      critical: 2
";

fn breaching_config() -> KpiConfig {
    KpiConfig::from_yaml_str(BREACHING_CONFIG).unwrap()
}

fn sample_tests() -> Vec<TestRecord> {
    vec![TestRecord::new("CYTO")
        .received("2025-01-05T08:00:00Z")
        .resulted("2025-01-05T10:00:00Z")]
}

#[test]
fn test_breaches_are_reported_with_levels() {
    let notices = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder {
        notices: Arc::clone(&notices),
    };
    let config = breaching_config();
    let period = Period::parse("2025-01-01", "2025-01-31").unwrap();

    let report = tracing::subscriber::with_default(recorder, || {
        KpiEngine::new(&config).compute(&period, &sample_tests(), None)
    });

    assert_eq!(report.metrics.cytogenetics_total_volume.status, Status::Warning);
    assert_eq!(report.metrics.tat.status, Status::Critical);

    let notices = notices.lock().unwrap();
    assert_eq!(
        *notices,
        vec![
            Notice {
                level: Level::WARN,
                metric: CYTO_VOLUME_KPI.to_string(),
                status: "warning".to_string(),
            },
            Notice {
                level: Level::ERROR,
                metric: TAT_KPI.to_string(),
                status: "critical".to_string(),
            },
        ]
    );
}

#[test]
fn test_no_notices_without_breach() {
    let notices = Arc::new(Mutex::new(Vec::new()));
    let recorder = Recorder {
        notices: Arc::clone(&notices),
    };
    let config = KpiConfig::default();
    let period = Period::parse("2025-01-01", "2025-01-31").unwrap();

    tracing::subscriber::with_default(recorder, || {
        KpiEngine::new(&config).compute(&period, &sample_tests(), None)
    });

    assert!(notices.lock().unwrap().is_empty());
}

#[test]
fn test_failing_subscriber_does_not_fail_compute() {
    let config = breaching_config();
    let period = Period::parse("2025-01-01", "2025-01-31").unwrap();

    let report = tracing::subscriber::with_default(Exploding, || {
        KpiEngine::new(&config).compute(&period, &sample_tests(), None)
    });

    assert_eq!(report.metrics.total_volume.total, 1);
    assert_eq!(report.metrics.tat.status, Status::Critical);
}
