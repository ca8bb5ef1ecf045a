//! Builder configuration
//!
//! One small struct seeds [`QueryBuilder`](crate::builder::QueryBuilder)
//! instances with site-wide rendering flags and carries the TTL for the query
//! cache. Everything has a sensible default; the optional `config` feature
//! adds TOML loading with an environment-variable override of the file path.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[cfg(feature = "config")]
use crate::error::{Error, Result};
#[cfg(feature = "config")]
use std::env;
#[cfg(feature = "config")]
use std::fs;
#[cfg(feature = "config")]
use std::path::Path;

/// Environment variable naming the configuration file to load
#[cfg(feature = "config")]
pub const CONFIG_PATH_VAR: &str = "SQLMASON_CONFIG";

/// Conventional configuration file name, read when present
#[cfg(feature = "config")]
pub const CONFIG_FILE: &str = "sqlmason.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Character comparisons fold case
    #[serde(default = "default_ignore_case")]
    pub ignore_case: bool,

    /// SELECT DISTINCT instead of plain SELECT
    #[serde(default)]
    pub use_distinct: bool,

    /// Paginate through the dialect's native clause instead of in memory
    #[serde(default = "default_native_pagination")]
    pub native_pagination: bool,

    /// Prepend a synthetic zero entry to lookup lists that have none
    #[serde(default)]
    pub auto_zero: bool,

    /// Display text of the synthetic zero entry
    #[serde(default = "default_none_label")]
    pub none_label: String,

    /// Lifetime of cached lookup lists and record counts
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

// Default value functions
fn default_ignore_case() -> bool {
    true
}
fn default_native_pagination() -> bool {
    true
}
fn default_none_label() -> String {
    "None/undefined".to_string()
}
fn default_cache_ttl() -> u64 {
    1800
} // 30 minutes

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            ignore_case: default_ignore_case(),
            use_distinct: false,
            native_pagination: default_native_pagination(),
            auto_zero: false,
            none_label: default_none_label(),
            cache_ttl_seconds: default_cache_ttl(),
        }
    }
}

impl BuilderConfig {
    /// TTL as a [`Duration`], the form
    /// [`Caches::with_query_ttl`](crate::cache::Caches::with_query_ttl) takes
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Load configuration from the file named by `SQLMASON_CONFIG`, else from
    /// `sqlmason.toml` in the working directory, else the defaults
    #[cfg(feature = "config")]
    pub fn load() -> Result<Self> {
        if let Ok(path) = env::var(CONFIG_PATH_VAR) {
            return Self::load_from_file(path);
        }
        if Path::new(CONFIG_FILE).exists() {
            return Self::load_from_file(CONFIG_FILE);
        }
        Ok(Self::default())
    }

    /// Load configuration from a TOML file
    #[cfg(feature = "config")]
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: BuilderConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        log::debug!("configuration loaded from {}", path.display());
        Ok(config)
    }
}
