use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub signals: SignalsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignalSourceKind {
    /// Deterministic synthetic data, no network
    #[default]
    Simulated,
    /// Provider gateway over HTTP
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalsConfig {
    #[serde(default)]
    pub source: SignalSourceKind,
    /// Gateway base URL (required for `http`)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token for the gateway
    #[serde(default)]
    pub api_key: Option<String>,
    /// Entities scored on every refresh
    #[serde(default = "default_entities")]
    pub entities: Vec<String>,
    /// Per-call fetch timeout in milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

fn default_entities() -> Vec<String> {
    [
        "AAPL", "GOOGL", "MSFT", "TSLA", "JPM", "BAC", "WMT", "JNJ", "PFE", "XOM",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            source: SignalSourceKind::default(),
            base_url: None,
            api_key: None,
            entities: default_entities(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl SignalsConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Prepended to every key as `<prefix>:`
    #[serde(default = "default_key_prefix")]
    pub key_prefix: Option<String>,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> Option<String> {
    Some("credint".to_string())
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            redis_url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between scheduled refreshes
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Run one refresh before serving
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
    /// Expiry of the latest batch
    #[serde(default = "default_latest_ttl_secs")]
    pub latest_ttl_secs: u64,
    /// Expiry of per-entity history
    #[serde(default = "default_history_ttl_secs")]
    pub history_ttl_secs: u64,
    /// Entries kept per entity
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Entries returned by history reads
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_interval_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

/// Upper bound for cache TTLs (one year)
pub const MAX_TTL_SECS: u64 = 365 * 24 * 3600;

fn default_latest_ttl_secs() -> u64 {
    3600
}

fn default_history_ttl_secs() -> u64 {
    86_400
}

fn default_history_capacity() -> usize {
    100
}

fn default_history_window() -> usize {
    50
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            run_on_startup: true,
            latest_ttl_secs: default_latest_ttl_secs(),
            history_ttl_secs: default_history_ttl_secs(),
            history_capacity: default_history_capacity(),
            history_window: default_history_window(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn latest_ttl(&self) -> Duration {
        Duration::from_secs(self.latest_ttl_secs)
    }

    pub fn history_ttl(&self) -> Duration {
        Duration::from_secs(self.history_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ModelConfig {
    /// Model artifact (JSON). The embedded model is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily-rotated log files
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("CREDINT_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (CREDINT_CACHE__BACKEND, etc.)
            .add_source(
                Environment::with_prefix("CREDINT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("signals.entities")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.signals.entities.is_empty() {
            errors.push("signals.entities must not be empty".to_string());
        }
        if self.signals.entities.iter().any(|e| e.trim().is_empty()) {
            errors.push("signals.entities must not contain blank ids".to_string());
        }
        if self.signals.fetch_timeout_ms == 0 {
            errors.push("signals.fetch_timeout_ms must be positive".to_string());
        }
        if self.signals.source == SignalSourceKind::Http
            && self
                .signals
                .base_url
                .as_deref()
                .map_or(true, |u| u.trim().is_empty())
        {
            errors.push("signals.base_url is required for the http source".to_string());
        }

        if self.cache.backend == CacheBackend::Redis && self.cache.redis_url.trim().is_empty() {
            errors.push("cache.redis_url is required for the redis backend".to_string());
        }

        if self.refresh.interval_secs == 0 {
            errors.push("refresh.interval_secs must be positive".to_string());
        }
        if self.refresh.latest_ttl_secs == 0 || self.refresh.history_ttl_secs == 0 {
            errors.push("refresh TTLs must be positive".to_string());
        }
        if self.refresh.latest_ttl_secs > MAX_TTL_SECS
            || self.refresh.history_ttl_secs > MAX_TTL_SECS
        {
            errors.push(format!("refresh TTLs must not exceed {MAX_TTL_SECS}s"));
        }
        if self.refresh.history_capacity == 0 {
            errors.push("refresh.history_capacity must be positive".to_string());
        }
        if self.refresh.history_window > self.refresh.history_capacity {
            errors.push(format!(
                "refresh.history_window ({}) exceeds history_capacity ({})",
                self.refresh.history_window, self.refresh.history_capacity
            ));
        }

        if self.api.port == 0 {
            errors.push("api.port must be non-zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.signals.entities.len(), 10);
        assert_eq!(config.refresh.history_capacity, 100);
        assert_eq!(config.refresh.history_window, 50);
        assert_eq!(config.refresh.latest_ttl(), Duration::from_secs(3600));
        assert_eq!(config.refresh.history_ttl(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let dir = std::env::temp_dir().join("credint-config-test-missing");
        let config = AppConfig::load_from(&dir).unwrap();
        assert_eq!(config.api.port, 8000);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
    }

    #[test]
    fn test_validation_collects_every_problem() {
        let mut config = AppConfig::default();
        config.signals.source = SignalSourceKind::Http;
        config.signals.entities.clear();
        config.refresh.history_window = 500;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("base_url")));
        assert!(errors.iter().any(|e| e.contains("history_window")));
    }

    #[test]
    fn test_oversized_ttl_is_rejected() {
        let mut config = AppConfig::default();
        config.refresh.history_ttl_secs = u64::MAX;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("must not exceed"));
    }
}
