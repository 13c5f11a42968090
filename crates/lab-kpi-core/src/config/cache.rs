//! Single-slot config cache.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::{ConfigLocator, ConfigResult, KpiConfig};

/// Loads the config once and hands out the same instance until invalidated.
///
/// Reads after population only take the read lock. Population happens under
/// the write lock with a re-check, so concurrent first callers load once.
/// Failed loads are not cached.
#[derive(Debug)]
pub struct ConfigCache {
    locator: ConfigLocator,
    slot: RwLock<Option<Arc<KpiConfig>>>,
}

impl ConfigCache {
    /// Create an empty cache over a locator.
    pub fn new(locator: ConfigLocator) -> Self {
        Self {
            locator,
            slot: RwLock::new(None),
        }
    }

    /// Cache over the default locations (honors `KPI_CONFIG_PATH`).
    pub fn from_env() -> Self {
        Self::new(ConfigLocator::from_env())
    }

    /// Return the cached config, loading it on first use.
    pub fn get_or_load(&self) -> ConfigResult<Arc<KpiConfig>> {
        {
            let guard = self.slot.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = guard.as_ref() {
                return Ok(Arc::clone(config));
            }
        }

        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(config) = guard.as_ref() {
            return Ok(Arc::clone(config));
        }

        let config = Arc::new(self.locator.load()?);
        *guard = Some(Arc::clone(&config));
        Ok(config)
    }

    /// Drop the cached config; the next `get_or_load` reads the source again.
    pub fn invalidate(&self) {
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            debug!("KPI config cache invalidated");
        }
    }

    /// Whether a config is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
