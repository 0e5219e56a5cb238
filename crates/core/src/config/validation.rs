//! Configuration validation rules.
//!
//! Applied after loading from environment, files, or defaults.

use thiserror::Error;

use crate::config::AppConfig;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `workers`, `batch_size`, or `max_pages` is 0
    /// - `fetch_timeout_ms` is outside [100ms, 5 minutes]
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `user_agent` is empty
    /// - any include/exclude pattern is not a valid regex
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid { field: "workers".into(), reason: "must be greater than 0".into() });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid { field: "batch_size".into(), reason: "must be greater than 0".into() });
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Invalid { field: "max_pages".into(), reason: "must be greater than 0".into() });
        }

        if self.fetch_timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.fetch_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        for pattern in self.include_patterns.iter().chain(&self.exclude_patterns) {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(ConfigError::Invalid {
                    field: "include_patterns/exclude_patterns".into(),
                    reason: format!("'{pattern}' is not a valid regex: {e}"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_workers() {
        let config = AppConfig { workers: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "workers"));
    }

    #[test]
    fn test_validate_zero_batch_size() {
        let config = AppConfig { batch_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "batch_size"));
    }

    #[test]
    fn test_validate_zero_max_pages() {
        let config = AppConfig { max_pages: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_pages"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let too_small = AppConfig { fetch_timeout_ms: 50, ..Default::default() };
        assert!(too_small.validate().is_err());

        let too_large = AppConfig { fetch_timeout_ms: 301_000, ..Default::default() };
        assert!(too_large.validate().is_err());

        let edge = AppConfig { fetch_timeout_ms: 100, ..Default::default() };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_pattern() {
        let config = AppConfig { exclude_patterns: vec!["[unclosed".to_string()], ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_good_patterns() {
        let config = AppConfig {
            include_patterns: vec!["^https://x\\.test/docs/".to_string()],
            exclude_patterns: vec!["\\.pdf$".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }
}
