//! Configuration module for the execution scheduler.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before any component is built.
//!
//! # Usage
//!
//! ```rust,ignore
//! use execution_scheduler::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("order timeout: {}s", config.executor.timeout_secs);
//! ```

mod observability;
mod persistence;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::adaptive_execution::OrderExecutionConfig;
use crate::domain::order_scheduling::AdvancedSchedulerConfig;
use crate::domain::shared::ContractId;
use crate::domain::trading::Quote;

pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use persistence::PersistenceConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Host loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Static quotes per contract, seeded into the paper venue and used
    /// for pricing.
    #[serde(default)]
    pub quotes: BTreeMap<String, Quote>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            quotes: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Configured quote for `contract`, or an empty quote with `fallback_tick`.
    #[must_use]
    pub fn quote_for(&self, contract: &ContractId, fallback_tick: Decimal) -> Quote {
        self.quotes
            .get(contract.as_str())
            .copied()
            .unwrap_or(Quote {
                tick: fallback_tick,
                ..Quote::default()
            })
    }
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Host loop configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Adaptive executor configuration.
    #[serde(default)]
    pub executor: OrderExecutionConfig,
    /// Scheduler defaults.
    #[serde(default)]
    pub scheduler: AdvancedSchedulerConfig,
    /// State persistence configuration.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |caps: &regex::Captures<'_>| {
        let default_value = caps.get(2).map_or("", |m| m.as_str());
        match std::env::var(&caps[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Validate configuration values.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` naming the first offending field.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    config
        .executor
        .validate()
        .map_err(|e| invalid(format!("executor: {e}")))?;

    let scheduler = &config.scheduler;
    if scheduler.default_batch_size == 0 {
        return Err(invalid("scheduler.default_batch_size must be positive"));
    }
    if scheduler.default_interval_secs == 0 {
        return Err(invalid("scheduler.default_interval_secs must be positive"));
    }
    if scheduler.default_num_slices == 0 {
        return Err(invalid("scheduler.default_num_slices must be positive"));
    }
    let ratio = scheduler.default_volume_randomize_ratio;
    if !(0.0..1.0).contains(&ratio) {
        return Err(invalid(format!(
            "scheduler.default_volume_randomize_ratio must be in [0, 1), got {ratio}"
        )));
    }
    if scheduler.default_price_tick <= Decimal::ZERO {
        return Err(invalid("scheduler.default_price_tick must be positive"));
    }

    if config.persistence.auto_save_interval_secs == 0 {
        return Err(invalid("persistence.auto_save_interval_secs must be positive"));
    }
    if config.engine.tick_interval_ms == 0 {
        return Err(invalid("engine.tick_interval_ms must be positive"));
    }
    for (contract, quote) in &config.engine.quotes {
        if !quote.is_two_sided() || quote.tick <= Decimal::ZERO {
            return Err(invalid(format!(
                "engine.quotes.{contract} needs a positive bid, ask and tick"
            )));
        }
    }

    let metrics = &config.observability.metrics;
    if metrics.enabled && metrics.socket_addr().is_err() {
        return Err(invalid(format!(
            "observability.metrics.listen_addr '{}' is not a socket address",
            metrics.listen_addr
        )));
    }

    Ok(())
}
