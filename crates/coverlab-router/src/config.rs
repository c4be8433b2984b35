//! Configuration file parsing for the Router.
//!
//! Loads bind address, the population being sampled, ledger backend
//! settings and whether μ may be shown to students.

use coverlab_domain::params::{
    DEFAULT_MAX_ALLOWED_VALUE, DEFAULT_MIN_ALLOWED_VALUE, DEFAULT_POPULATION_MEAN,
    DEFAULT_POPULATION_STD_DEV, DEFAULT_SAMPLE_SIZE,
};
use coverlab_domain::{ParameterError, PopulationParameters};
use coverlab_store::DEFAULT_QUEUE_DEPTH;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Router configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Population section cannot produce an interval
    #[error("Invalid population parameters: {0}")]
    InvalidPopulation(#[from] ParameterError),

    /// Ledger section out of range
    #[error("Invalid ledger settings: {0}")]
    InvalidLedger(String),
}

/// Router configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// Population the class is sampling from
    #[serde(default)]
    pub population: PopulationConfig,

    /// Ledger backend
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Expose μ on `GET /parameters` (default: false)
    #[serde(default)]
    pub reveal_population_mean: bool,
}

/// `[population]` section
#[derive(Debug, Clone, Deserialize)]
pub struct PopulationConfig {
    /// μ
    #[serde(default = "default_mean")]
    pub mean: f64,
    /// σ
    #[serde(default = "default_std_dev")]
    pub std_dev: f64,
    /// n
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Lowest admissible observation
    #[serde(default = "default_min_allowed")]
    pub min_allowed_value: f64,
    /// Highest admissible observation
    #[serde(default = "default_max_allowed")]
    pub max_allowed_value: f64,
}

/// `[ledger]` section
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// SQLite file; the ledger lives in memory when absent
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Bound on each ledger call in milliseconds (default: 5000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How long results pages may be stale, in seconds (default: 2)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Submissions that may wait for the ledger writer (default: 256)
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

fn default_mean() -> f64 {
    DEFAULT_POPULATION_MEAN
}

fn default_std_dev() -> f64 {
    DEFAULT_POPULATION_STD_DEV
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

fn default_min_allowed() -> f64 {
    DEFAULT_MIN_ALLOWED_VALUE
}

fn default_max_allowed() -> f64 {
    DEFAULT_MAX_ALLOWED_VALUE
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_cache_ttl() -> u64 {
    2
}

fn default_queue_depth() -> usize {
    DEFAULT_QUEUE_DEPTH
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            mean: default_mean(),
            std_dev: default_std_dev(),
            sample_size: default_sample_size(),
            min_allowed_value: default_min_allowed(),
            max_allowed_value: default_max_allowed(),
        }
    }
}

impl PopulationConfig {
    /// Validate into domain parameters
    pub fn to_parameters(&self) -> Result<PopulationParameters, ParameterError> {
        PopulationParameters::new(
            self.mean,
            self.std_dev,
            self.sample_size,
            self.min_allowed_value,
            self.max_allowed_value,
        )
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: None,
            timeout_ms: default_timeout_ms(),
            cache_ttl_secs: default_cache_ttl(),
            queue_depth: default_queue_depth(),
        }
    }
}

impl LedgerConfig {
    /// Per-call ledger timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache staleness bound
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl RouterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.population.to_parameters()?;
        if self.ledger.timeout_ms == 0 {
            return Err(ConfigError::InvalidLedger(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.ledger.queue_depth == 0 {
            return Err(ConfigError::InvalidLedger(
                "queue_depth must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        RouterConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            population: PopulationConfig::default(),
            ledger: LedgerConfig::default(),
            reveal_population_mean: false,
        }
    }

    /// Validated population parameters
    pub fn population_parameters(&self) -> Result<PopulationParameters, ConfigError> {
        Ok(self.population.to_parameters()?)
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
