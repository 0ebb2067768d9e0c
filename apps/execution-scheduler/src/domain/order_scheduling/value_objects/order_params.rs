//! Advanced Order Parameters
//!
//! Per-request algorithm parameters. Fields left unset fall back to
//! [`AdvancedSchedulerConfig`] defaults; the resolved values are validated
//! and turned into a [`SplitPlan`] for the chosen algorithm.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AdvancedSchedulerConfig, AlgorithmKind};
use crate::domain::order_scheduling::errors::ScheduleError;

/// Algorithm parameters supplied with an advanced order request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedOrderParams {
    /// Per-batch cap for ICEBERG / CLASSIC_ICEBERG.
    pub batch_size: Option<u64>,
    /// Release interval for TIMED_SPLIT (seconds).
    pub interval_secs: Option<u64>,
    /// Per-order cap for TIMED_SPLIT.
    pub per_order_volume: Option<u64>,
    /// Execution window for TWAP / ENHANCED_TWAP / VWAP (seconds).
    pub time_window_secs: Option<u64>,
    /// Slice count for TWAP / ENHANCED_TWAP.
    pub num_slices: Option<u32>,
    /// Relative volume weight per VWAP slice.
    pub volume_profile: Vec<Decimal>,
    /// CLASSIC_ICEBERG batch perturbation, in `[0, 1)`.
    pub volume_randomize_ratio: Option<f64>,
    /// CLASSIC_ICEBERG price offset range (ticks).
    pub price_offset_ticks: Option<u32>,
    /// Tick size for CLASSIC_ICEBERG price offsets.
    pub price_tick: Option<Decimal>,
}

impl AdvancedOrderParams {
    /// ICEBERG parameters.
    #[must_use]
    pub fn iceberg(batch_size: u64) -> Self {
        Self {
            batch_size: Some(batch_size),
            ..Self::default()
        }
    }

    /// TIMED_SPLIT parameters.
    #[must_use]
    pub fn timed_split(interval_secs: u64, per_order_volume: u64) -> Self {
        Self {
            interval_secs: Some(interval_secs),
            per_order_volume: Some(per_order_volume),
            ..Self::default()
        }
    }

    /// CLASSIC_ICEBERG parameters.
    #[must_use]
    pub fn classic_iceberg(
        batch_size: u64,
        volume_randomize_ratio: f64,
        price_offset_ticks: u32,
        price_tick: Decimal,
    ) -> Self {
        Self {
            batch_size: Some(batch_size),
            volume_randomize_ratio: Some(volume_randomize_ratio),
            price_offset_ticks: Some(price_offset_ticks),
            price_tick: Some(price_tick),
            ..Self::default()
        }
    }

    /// TWAP / ENHANCED_TWAP parameters.
    #[must_use]
    pub fn twap(time_window_secs: u64, num_slices: u32) -> Self {
        Self {
            time_window_secs: Some(time_window_secs),
            num_slices: Some(num_slices),
            ..Self::default()
        }
    }

    /// VWAP parameters.
    #[must_use]
    pub fn vwap(time_window_secs: u64, volume_profile: Vec<Decimal>) -> Self {
        Self {
            time_window_secs: Some(time_window_secs),
            volume_profile,
            ..Self::default()
        }
    }

    /// Fill unset fields from `defaults`, validate, and build the split plan.
    ///
    /// Returns the resolved parameters (for persistence) alongside the plan.
    pub fn resolve(
        &self,
        kind: AlgorithmKind,
        defaults: &AdvancedSchedulerConfig,
    ) -> Result<(Self, SplitPlan), ScheduleError> {
        let plan = match kind {
            AlgorithmKind::Iceberg => SplitPlan::Iceberg {
                batch_size: positive(
                    "batch_size",
                    self.batch_size.unwrap_or(defaults.default_batch_size),
                )?,
            },
            AlgorithmKind::TimedSplit => SplitPlan::TimedSplit {
                interval_secs: positive(
                    "interval_secs",
                    self.interval_secs.unwrap_or(defaults.default_interval_secs),
                )?,
                per_order_volume: positive(
                    "per_order_volume",
                    self.per_order_volume.unwrap_or(defaults.default_batch_size),
                )?,
            },
            AlgorithmKind::ClassicIceberg => {
                let ratio = self
                    .volume_randomize_ratio
                    .unwrap_or(defaults.default_volume_randomize_ratio);
                if !(0.0..1.0).contains(&ratio) {
                    return Err(ScheduleError::invalid(
                        "volume_randomize_ratio",
                        format!("{ratio} is outside [0, 1)"),
                    ));
                }
                let price_tick = self.price_tick.unwrap_or(defaults.default_price_tick);
                if price_tick <= Decimal::ZERO {
                    return Err(ScheduleError::invalid(
                        "price_tick",
                        format!("{price_tick} must be positive"),
                    ));
                }
                SplitPlan::ClassicIceberg {
                    batch_size: positive(
                        "batch_size",
                        self.batch_size.unwrap_or(defaults.default_batch_size),
                    )?,
                    randomize_ratio: ratio,
                    price_offset_ticks: self
                        .price_offset_ticks
                        .unwrap_or(defaults.default_price_offset_ticks),
                    price_tick,
                }
            }
            AlgorithmKind::Twap | AlgorithmKind::EnhancedTwap => {
                let num_slices = self.num_slices.unwrap_or(defaults.default_num_slices);
                positive("num_slices", u64::from(num_slices))?;
                SplitPlan::Twap {
                    time_window_secs: positive(
                        "time_window_secs",
                        self.time_window_secs
                            .ok_or_else(|| ScheduleError::missing("time_window_secs", kind))?,
                    )?,
                    num_slices,
                }
            }
            AlgorithmKind::Vwap => {
                if self.volume_profile.is_empty() {
                    return Err(ScheduleError::missing("volume_profile", kind));
                }
                if let Some(weight) = self.volume_profile.iter().find(|w| **w <= Decimal::ZERO) {
                    return Err(ScheduleError::invalid(
                        "volume_profile",
                        format!("weight {weight} must be positive"),
                    ));
                }
                SplitPlan::Vwap {
                    time_window_secs: positive(
                        "time_window_secs",
                        self.time_window_secs
                            .ok_or_else(|| ScheduleError::missing("time_window_secs", kind))?,
                    )?,
                    volume_profile: self.volume_profile.clone(),
                }
            }
        };

        Ok((plan.to_params(), plan))
    }
}

/// Validated, fully-resolved parameters for one algorithm.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitPlan {
    /// Fixed batches, revealed sequentially.
    Iceberg {
        /// Per-batch cap.
        batch_size: u64,
    },
    /// Fixed batches at a fixed interval.
    TimedSplit {
        /// Seconds between releases.
        interval_secs: u64,
        /// Per-order cap.
        per_order_volume: u64,
    },
    /// Randomized batches, revealed sequentially.
    ClassicIceberg {
        /// Nominal batch size.
        batch_size: u64,
        /// Batch perturbation ratio.
        randomize_ratio: f64,
        /// Price offset range (ticks).
        price_offset_ticks: u32,
        /// Tick size.
        price_tick: Decimal,
    },
    /// Even slices across a window.
    Twap {
        /// Window length (seconds).
        time_window_secs: u64,
        /// Slice count.
        num_slices: u32,
    },
    /// Profile-weighted slices across a window.
    Vwap {
        /// Window length (seconds).
        time_window_secs: u64,
        /// Weight per slice.
        volume_profile: Vec<Decimal>,
    },
}

impl SplitPlan {
    fn to_params(&self) -> AdvancedOrderParams {
        match self {
            Self::Iceberg { batch_size } => AdvancedOrderParams::iceberg(*batch_size),
            Self::TimedSplit {
                interval_secs,
                per_order_volume,
            } => AdvancedOrderParams::timed_split(*interval_secs, *per_order_volume),
            Self::ClassicIceberg {
                batch_size,
                randomize_ratio,
                price_offset_ticks,
                price_tick,
            } => AdvancedOrderParams::classic_iceberg(
                *batch_size,
                *randomize_ratio,
                *price_offset_ticks,
                *price_tick,
            ),
            Self::Twap {
                time_window_secs,
                num_slices,
            } => AdvancedOrderParams::twap(*time_window_secs, *num_slices),
            Self::Vwap {
                time_window_secs,
                volume_profile,
            } => AdvancedOrderParams::vwap(*time_window_secs, volume_profile.clone()),
        }
    }
}

fn positive(field: &str, value: u64) -> Result<u64, ScheduleError> {
    if value == 0 {
        return Err(ScheduleError::invalid(field, "must be positive"));
    }
    Ok(value)
}
