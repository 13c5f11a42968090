//! KPI configuration: typed model, file loader and process-lifetime cache.
//!
//! The YAML document looks like:
//!
//! ```yaml
//! metadata:
//!   version: "1.0"
//! kpis:
//!   cytogenetics_total_volume:
//!     thresholds: { warning: 120, critical: 80 }
//!   tat:
//!     thresholds: { warning: 72, critical: 120 }
//!   tests_per_fte:
//!     hours_per_fte_day: 8
//! ```

mod cache;
mod loader;

pub use cache::*;
pub use loader::*;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Category-specific volume KPI.
pub const CYTO_VOLUME_KPI: &str = "cytogenetics_total_volume";
/// Turnaround-time KPI.
pub const TAT_KPI: &str = "tat";
/// Throughput KPI.
pub const TESTS_PER_FTE_KPI: &str = "tests_per_fte";

/// Hours in one full-time-equivalent day when the config is silent.
pub const DEFAULT_HOURS_PER_FTE_DAY: f64 = 8.0;

const HOURS_PER_FTE_DAY_KEY: &str = "hours_per_fte_day";
const LEGACY_HOURS_PER_FTE_DAY_KEY: &str = "baseline_per_fte_per_day";

/// Keys with this prefix are internal and never shown to callers.
const INTERNAL_KEY_PREFIX: char = '_';

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("KPI config not found at: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read KPI config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse KPI config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    /// Path the loader resolved when the error occurred.
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::NotFound { path }
            | ConfigError::Io { path, .. }
            | ConfigError::Parse { path, .. } => path,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Loaded KPI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KpiConfig {
    /// Per-KPI thresholds and parameters, keyed by KPI name
    #[serde(default, deserialize_with = "kpi_map")]
    pub kpis: BTreeMap<String, KpiDefinition>,
    /// Document metadata
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ConfigMetadata,
    /// Any other top-level keys, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
    /// Where the config was loaded from
    #[serde(skip)]
    source_path: Option<PathBuf>,
}

/// Config document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigMetadata {
    /// Config version, echoed into every report
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Configuration for a single KPI.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KpiDefinition {
    /// Warning/critical bounds; absent means no threshold check
    #[serde(default)]
    pub thresholds: Option<Thresholds>,
    /// KPI-specific parameters (e.g. `hours_per_fte_day`)
    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

/// Warning/critical bounds for a KPI. Either may be absent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    #[serde(default)]
    pub warning: Option<f64>,
    #[serde(default)]
    pub critical: Option<f64>,
}

impl Thresholds {
    pub fn new(warning: Option<f64>, critical: Option<f64>) -> Self {
        Self { warning, critical }
    }
}

impl KpiDefinition {
    /// Numeric parameter value; numeric strings are accepted.
    pub fn param_f64(&self, key: &str) -> Option<f64> {
        match self.params.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl KpiConfig {
    /// Parse a YAML document. An empty document yields an empty config.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let parsed: Option<KpiConfig> = serde_yaml::from_str(yaml)?;
        Ok(parsed.unwrap_or_default())
    }

    /// Configuration for a KPI, if present.
    pub fn kpi(&self, name: &str) -> Option<&KpiDefinition> {
        self.kpis.get(name)
    }

    /// Thresholds for a KPI, if configured.
    pub fn thresholds(&self, name: &str) -> Option<&Thresholds> {
        self.kpi(name)?.thresholds.as_ref()
    }

    /// Insert or replace thresholds for a KPI.
    #[cfg(test)]
    pub(crate) fn set_thresholds(&mut self, name: &str, thresholds: Thresholds) {
        self.kpis.entry(name.to_string()).or_default().thresholds = Some(thresholds);
    }

    /// `metadata.version`, verbatim.
    pub fn version(&self) -> Option<&Value> {
        self.metadata.version.as_ref()
    }

    /// Hours per full-time-equivalent day for the throughput KPI.
    ///
    /// Reads `hours_per_fte_day`, then the legacy `baseline_per_fte_per_day`,
    /// then falls back to 8.
    pub fn hours_per_fte_day(&self) -> f64 {
        self.kpi(TESTS_PER_FTE_KPI)
            .and_then(|def| {
                def.param_f64(HOURS_PER_FTE_DAY_KEY)
                    .or_else(|| def.param_f64(LEGACY_HOURS_PER_FTE_DAY_KEY))
            })
            .unwrap_or(DEFAULT_HOURS_PER_FTE_DAY)
    }

    /// Path the config was loaded from, when loaded from a file.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub(crate) fn with_source_path(mut self, path: &Path) -> Self {
        self.source_path = Some(path.to_path_buf());
        self
    }

    /// Config as shown to callers: internal `_`-prefixed keys removed.
    pub fn public_view(&self) -> Result<Value, serde_json::Error> {
        let mut view = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut view {
            map.retain(|key, _| !key.starts_with(INTERNAL_KEY_PREFIX));
        }
        Ok(view)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A KPI entry left empty in YAML (`tat:`) behaves like an empty mapping.
fn kpi_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, KpiDefinition>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<KpiDefinition>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, def)| (name, def.unwrap_or_default()))
        .collect())
}
