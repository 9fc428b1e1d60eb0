//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SWCACHE_*)
//! 2. TOML config file (if SWCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::CacheVersion;
use crate::policy::PathPolicy;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SWCACHE_*)
/// 2. TOML config file (if SWCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite file holding every named cache store.
    ///
    /// Set via SWCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Name of the current cache store.
    ///
    /// Changing it invalidates everything cached under the previous name;
    /// the old store is purged on the next activation.
    /// Set via SWCACHE_CACHE_NAME environment variable.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Base URL that relative manifest entries resolve against.
    ///
    /// Set via SWCACHE_SCOPE_URL environment variable.
    #[serde(default = "default_scope_url")]
    pub scope_url: String,

    /// Resources fetched and stored during install, in order.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Path prefix of responses that receive cross-origin isolation headers.
    ///
    /// Set via SWCACHE_ISOLATION_PREFIX environment variable.
    #[serde(default = "default_isolation_prefix")]
    pub isolation_prefix: String,

    /// File extension of large immutable assets skipped by bulk refresh.
    ///
    /// Set via SWCACHE_REFRESH_EXEMPT_EXTENSION environment variable.
    #[serde(default = "default_refresh_exempt_extension")]
    pub refresh_exempt_extension: String,

    /// User-Agent string for network requests.
    ///
    /// Set via SWCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network request timeout in milliseconds.
    ///
    /// Set via SWCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swcache.sqlite")
}

fn default_cache_name() -> String {
    "DigitaPWACache".into()
}

fn default_scope_url() -> String {
    "http://localhost:8080/".into()
}

fn default_manifest() -> Vec<String> {
    vec!["./index".into(), "./settings".into()]
}

fn default_isolation_prefix() -> String {
    "/Digita".into()
}

fn default_refresh_exempt_extension() -> String {
    ".vrm".into()
}

fn default_user_agent() -> String {
    "swcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_name: default_cache_name(),
            scope_url: default_scope_url(),
            manifest: default_manifest(),
            isolation_prefix: default_isolation_prefix(),
            refresh_exempt_extension: default_refresh_exempt_extension(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The current cache version, for injection into the worker components.
    pub fn version(&self) -> CacheVersion {
        CacheVersion::new(self.cache_name.clone())
    }

    /// Path classification rules built from the configured prefix and extension.
    pub fn path_policy(&self) -> PathPolicy {
        PathPolicy::new(self.isolation_prefix.clone(), self.refresh_exempt_extension.clone())
    }

    /// Parsed scope URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `scope_url` is not an absolute URL.
    pub fn scope(&self) -> Result<url::Url, ConfigError> {
        url::Url::parse(&self.scope_url)
            .map_err(|e| ConfigError::Invalid { field: "scope_url".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SWCACHE_`
    /// 2. TOML file from `SWCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWCACHE_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
