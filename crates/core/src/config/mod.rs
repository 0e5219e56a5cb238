//! Application configuration with layered loading.
//!
//! Loading precedence (highest wins):
//! 1. Environment variables (SWEEP_*)
//! 2. TOML config file (if SWEEP_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! Components never read the environment themselves; everything is passed
//! in as plain configuration values from here.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

use crate::report::Level;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// WCAG conformance ceiling: rules at this level and below are active.
    #[serde(default = "default_conformance_level")]
    pub conformance_level: Level,

    /// Rule IDs to include; empty means all built-in rules.
    #[serde(default)]
    pub include_rules: Vec<String>,

    /// Rule IDs to exclude, applied after includes.
    #[serde(default)]
    pub exclude_rules: Vec<String>,

    /// Worker pool size for the parallel dispatcher and the crawler.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Number of files validated per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Whether the result cache is consulted at all.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Directory holding cache entries, one file per key.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Time-to-live for cache entries in seconds (default: 24 hours).
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Hard ceiling on pages visited per crawl.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum link depth from the seed URL.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Regex patterns a discovered URL must match (if any are set).
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns that disqualify a discovered URL.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Page fetch timeout in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Maximum bytes to fetch per page.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_conformance_level() -> Level {
    Level::Aa
}

fn default_workers() -> usize {
    4
}

fn default_batch_size() -> usize {
    20
}

fn default_true() -> bool {
    true
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".sweep-cache")
}

fn default_cache_ttl_secs() -> u64 {
    86_400
}

fn default_max_pages() -> usize {
    100
}

fn default_max_depth() -> usize {
    3
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_user_agent() -> String {
    "a11ysweep/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            conformance_level: default_conformance_level(),
            include_rules: Vec::new(),
            exclude_rules: Vec::new(),
            workers: default_workers(),
            batch_size: default_batch_size(),
            cache_enabled: true,
            cache_dir: default_cache_dir(),
            cache_ttl_secs: default_cache_ttl_secs(),
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_bytes: default_max_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Fetch timeout as a Duration for use with reqwest/tokio.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or validation
    /// fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWEEP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWEEP_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.conformance_level, Level::Aa);
        assert_eq!(config.workers, 4);
        assert_eq!(config.batch_size, 20);
        assert!(config.cache_enabled);
        assert_eq!(config.cache_dir, PathBuf::from(".sweep-cache"));
        assert_eq!(config.cache_ttl_secs, 86_400);
        assert_eq!(config.max_pages, 100);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.fetch_timeout_ms, 10_000);
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.user_agent, "a11ysweep/0.1");
        assert!(config.include_rules.is_empty());
        assert!(config.include_patterns.is_empty());
    }

    #[test]
    fn test_duration_helpers() {
        let config = AppConfig::default();
        assert_eq!(config.fetch_timeout(), Duration::from_millis(10_000));
        assert_eq!(config.cache_ttl(), Duration::from_secs(86_400));
    }
}
