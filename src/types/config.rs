//! Configuration for HaiTale.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::HaitaleResult;

/// File name looked up in the current directory and in the user config dir.
pub const CONFIG_FILE_NAME: &str = "haitale.toml";

/// Environment variable that overrides `openrouter.api_key`.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Main configuration for HaiTale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// OpenRouter endpoint and credentials.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Retry and backoff settings.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Circuit breaker settings.
    #[serde(default)]
    pub circuit: CircuitConfig,

    /// Candidate pre-filter settings.
    #[serde(default)]
    pub prefilter: PrefilterConfig,

    /// Prompt construction settings.
    #[serde(default)]
    pub prompt: PromptConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Per-request HTTP timeout (in seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// OpenRouter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// API key. Missing or empty disables the AI path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Chat completions endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sent as `HTTP-Referer`.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Sent as `X-Title`.
    #[serde(default = "default_site_name")]
    pub site_name: String,
}

impl OpenRouterConfig {
    /// Returns the API key when one is configured and non-empty.
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            site_url: default_site_url(),
            site_name: default_site_name(),
        }
    }
}

fn default_api_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "mistralai/mistral-7b-instruct:free".to_string()
}

fn default_site_url() -> String {
    "https://github.com/haitale/haitale".to_string()
}

fn default_site_name() -> String {
    "HaiTale".to_string()
}

/// Retry settings for the completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per request (including the first).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (in milliseconds).
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound for the doubled delay (in milliseconds).
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Fraction of the delay added as random jitter (0.0 - 1.0).
    #[serde(default = "default_jitter_fraction")]
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            jitter_fraction: default_jitter_fraction(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_jitter_fraction() -> f64 {
    0.2
}

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Entry time to live in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Maximum number of entries.
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_cache_ttl(),
            max_entries: default_cache_max_entries(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    3600 // 1 hour
}

fn default_cache_max_entries() -> usize {
    100
}

/// Circuit breaker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitConfig {
    /// Enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Consecutive failures that open the circuit.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Time the circuit stays open (in seconds).
    #[serde(default = "default_reset_timeout")]
    pub reset_timeout_secs: u64,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: default_failure_threshold(),
            reset_timeout_secs: default_reset_timeout(),
        }
    }
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_reset_timeout() -> u64 {
    60
}

/// Pre-filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefilterConfig {
    /// Enabled. When disabled the whole catalog is sent to the model.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of candidates sent to the model.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Minimum relevance score a candidate must exceed.
    #[serde(default = "default_prefilter_threshold")]
    pub threshold: f64,
}

impl Default for PrefilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_candidates: default_max_candidates(),
            threshold: default_prefilter_threshold(),
        }
    }
}

fn default_max_candidates() -> usize {
    50
}

fn default_prefilter_threshold() -> f64 {
    0.15
}

/// Prompt settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Characters of each mod description kept in the prompt.
    #[serde(default = "default_description_max_length")]
    pub description_max_length: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            description_max_length: default_description_max_length(),
        }
    }
}

fn default_description_max_length() -> usize {
    100
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> HaitaleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> HaitaleResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            openrouter: OpenRouterConfig::default(),
            retry: RetryConfig::default(),
            cache: CacheConfig::default(),
            circuit: CircuitConfig::default(),
            prefilter: PrefilterConfig::default(),
            prompt: PromptConfig::default(),
        }
    }

    /// Tries the current directory, then the user config dir, then defaults.
    pub fn load_or_default() -> Self {
        Self::candidate_paths()
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| Self::load(p).ok())
            .unwrap_or_else(Self::default_config)
            .with_env_overrides()
    }

    /// Paths searched by [`Config::load_or_default`], in order.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("haitale").join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Applies `OPENROUTER_API_KEY` when it is set and non-empty.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.openrouter.api_key = Some(key);
            }
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.circuit.failure_threshold, 5);
        assert_eq!(config.prefilter.max_candidates, 50);
        assert!((config.prefilter.threshold - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.prompt.description_max_length, 100);
        assert!(config.openrouter.credential().is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [retry]
            max_attempts = 7

            [openrouter]
            api_key = "sk-test"
            "#,
        )
        .unwrap();

        assert_eq!(config.retry.max_attempts, 7);
        assert_eq!(config.retry.initial_backoff_ms, 1000);
        assert_eq!(config.openrouter.credential(), Some("sk-test"));
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_blank_api_key_is_not_a_credential() {
        let mut config = Config::default();
        config.openrouter.api_key = Some("   ".to_string());

        assert!(config.openrouter.credential().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.circuit.reset_timeout_secs = 120;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.circuit.reset_timeout_secs, 120);
        assert_eq!(loaded.openrouter.model, config.openrouter.model);
    }
}
