//! Advanced Scheduler Configuration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Defaults applied to request parameters the caller leaves unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSchedulerConfig {
    /// Iceberg batch size (contracts).
    pub default_batch_size: u64,
    /// Timed-split interval (seconds).
    pub default_interval_secs: u64,
    /// TWAP slice count.
    pub default_num_slices: u32,
    /// Classic-iceberg batch size randomization, in `[0, 1)`.
    pub default_volume_randomize_ratio: f64,
    /// Classic-iceberg price offset range (ticks).
    pub default_price_offset_ticks: u32,
    /// Tick size used for classic-iceberg price offsets.
    pub default_price_tick: Decimal,
}

impl Default for AdvancedSchedulerConfig {
    fn default() -> Self {
        Self {
            default_batch_size: 10,
            default_interval_secs: 60,
            default_num_slices: 5,
            default_volume_randomize_ratio: 0.1,
            default_price_offset_ticks: 1,
            default_price_tick: Decimal::new(1, 2), // 0.01
        }
    }
}

impl AdvancedSchedulerConfig {
    /// Configuration with no randomization, for reproducible schedules.
    #[must_use]
    pub fn deterministic() -> Self {
        Self {
            default_volume_randomize_ratio: 0.0,
            default_price_offset_ticks: 0,
            ..Self::default()
        }
    }
}
