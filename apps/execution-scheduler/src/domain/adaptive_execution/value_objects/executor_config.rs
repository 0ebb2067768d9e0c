//! Order Execution Configuration

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::adaptive_execution::errors::ExecutionError;

/// Pricing, timeout and retry settings for the adaptive executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderExecutionConfig {
    /// Seconds a venue order may rest before it is flagged.
    pub timeout_secs: u64,
    /// Price-walk retries allowed per order.
    pub max_retries: u32,
    /// Ticks beyond the touch used for the initial limit price.
    pub slippage_ticks: u32,
    /// Fallback tick size when the caller supplies none.
    pub price_tick: Decimal,
}

impl Default for OrderExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            slippage_ticks: 2,
            price_tick: Decimal::new(2, 1), // 0.2
        }
    }
}

impl OrderExecutionConfig {
    /// Timeout as a duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        i64::try_from(self.timeout_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ExecutionError> {
        if self.timeout_secs == 0 {
            return Err(ExecutionError::invalid_config(
                "timeout_secs",
                "must be positive",
            ));
        }
        if self.price_tick <= Decimal::ZERO {
            return Err(ExecutionError::invalid_config(
                "price_tick",
                format!("{} must be positive", self.price_tick),
            ));
        }
        Ok(())
    }
}
