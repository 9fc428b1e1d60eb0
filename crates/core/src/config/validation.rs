//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_name` or `user_agent` is empty
    /// - `scope_url` is not an absolute http(s) URL
    /// - a `manifest` entry is blank
    /// - `isolation_prefix` does not start with `/`
    /// - `refresh_exempt_extension` is not of the form `.ext`
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.trim().is_empty() {
            return Err(invalid("cache_name", "must not be empty"));
        }

        let scope = self.scope()?;
        if !matches!(scope.scheme(), "http" | "https") {
            return Err(invalid("scope_url", "scheme must be http or https"));
        }

        if self.manifest.iter().any(|entry| entry.trim().is_empty()) {
            return Err(invalid("manifest", "entries must not be empty"));
        }

        if !self.isolation_prefix.starts_with('/') {
            return Err(invalid("isolation_prefix", "must start with '/'"));
        }

        if !self.refresh_exempt_extension.starts_with('.') || self.refresh_exempt_extension.len() < 2 {
            return Err(invalid("refresh_exempt_extension", "must look like '.ext'"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.manifest.is_empty() {
            tracing::warn!(cache_name = %self.cache_name, "manifest is empty; install will not pre-populate the cache");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_cache_name() {
        let config = AppConfig { cache_name: "  ".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_name"));
    }

    #[test]
    fn test_validate_relative_scope() {
        let config = AppConfig { scope_url: "/app/".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "scope_url"));
    }

    #[test]
    fn test_validate_non_http_scope() {
        let config = AppConfig { scope_url: "file:///srv/app/".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "scope_url"));
    }

    #[test]
    fn test_validate_blank_manifest_entry() {
        let config = AppConfig { manifest: vec!["./index".into(), "".into()], ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "manifest"));
    }

    #[test]
    fn test_validate_empty_manifest_allowed() {
        let config = AppConfig { manifest: Vec::new(), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_isolation_prefix() {
        let config = AppConfig { isolation_prefix: "Digita".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "isolation_prefix"));
    }

    #[test]
    fn test_validate_exempt_extension() {
        for ext in ["vrm", "."] {
            let config = AppConfig { refresh_exempt_extension: ext.into(), ..Default::default() };
            let result = config.validate();
            assert!(
                matches!(result, Err(ConfigError::Invalid { ref field, .. }) if field == "refresh_exempt_extension"),
                "{ext} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }
}
