//! Config source resolution and loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{ConfigError, ConfigResult, KpiConfig};

/// Environment variable holding an explicit config path.
pub const CONFIG_PATH_ENV: &str = "KPI_CONFIG_PATH";

/// Conventional location relative to a project root.
pub const DEFAULT_CONFIG_RELATIVE: &str = "config/kpi_config.yaml";

/// Decides which file the config is read from.
///
/// An explicit override is used as-is, with no fallback. Otherwise the first
/// existing candidate wins; if none exists the first candidate is reported
/// in the `NotFound` error so operators can see where the loader looked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocator {
    override_path: Option<PathBuf>,
    candidates: Vec<PathBuf>,
}

impl ConfigLocator {
    /// Create a locator over explicit candidates.
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self {
            override_path: None,
            candidates,
        }
    }

    /// Locator for the default candidates, honoring `KPI_CONFIG_PATH`.
    pub fn from_env() -> Self {
        let locator = Self::new(Self::default_candidates());
        match env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => locator.with_override(PathBuf::from(path)),
            _ => locator,
        }
    }

    /// Workspace root, crate root, then the working directory.
    pub fn default_candidates() -> Vec<PathBuf> {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let mut candidates = vec![
            manifest_dir.join("../..").join(DEFAULT_CONFIG_RELATIVE),
            manifest_dir.join(DEFAULT_CONFIG_RELATIVE),
        ];
        if let Ok(cwd) = env::current_dir() {
            candidates.push(cwd.join(DEFAULT_CONFIG_RELATIVE));
        }
        candidates
    }

    /// Use an explicit path. A leading `~` expands to the home directory.
    pub fn with_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(expand_home(path.into()));
        self
    }

    /// Resolve the path to load.
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.override_path {
            debug!(path = %path.display(), "Using KPI config override");
            return path.clone();
        }

        for candidate in &self.candidates {
            if candidate.exists() {
                debug!(path = %candidate.display(), "Found KPI config candidate");
                return candidate.clone();
            }
        }

        self.candidates
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_RELATIVE))
    }

    /// Resolve and load.
    pub fn load(&self) -> ConfigResult<KpiConfig> {
        load_config_from(&self.resolve())
    }
}

/// Load the config from the default locations (see [`ConfigLocator::from_env`]).
pub fn load_config() -> ConfigResult<KpiConfig> {
    ConfigLocator::from_env().load()
}

/// Load and parse a config file.
pub fn load_config_from(path: &Path) -> ConfigResult<KpiConfig> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config = KpiConfig::from_yaml_str(&contents)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
        .with_source_path(path);

    info!(
        path = %path.display(),
        version = ?config.version(),
        kpis = config.kpis.len(),
        "Loaded KPI config"
    );
    Ok(config)
}

fn expand_home(path: PathBuf) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path,
        },
        Err(_) => path,
    }
}
