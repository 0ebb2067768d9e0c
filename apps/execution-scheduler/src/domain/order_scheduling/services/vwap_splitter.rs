//! VWAP Splitter Domain Service

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::iceberg_splitter::seconds;
use super::twap_splitter::offset_time;
use crate::domain::order_scheduling::value_objects::PlannedSlice;

/// Splits a total quantity in proportion to a volume profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct VwapSplitter;

impl VwapSplitter {
    /// One slice per profile weight, sized `round(total * w_i / sum(w))`.
    ///
    /// The last slice absorbs the rounding error. A slice is cut short only
    /// when rounding up would allocate more than `total`. Slice `i` is
    /// scheduled at `start + i * window / len`.
    #[must_use]
    pub fn split(
        total: u64,
        volume_profile: &[Decimal],
        time_window_secs: u64,
        start: DateTime<Utc>,
    ) -> Vec<PlannedSlice> {
        let weight_sum: Decimal = volume_profile.iter().sum();
        if volume_profile.is_empty() || weight_sum <= Decimal::ZERO {
            return Vec::new();
        }

        let n = volume_profile.len() as u64;
        let window_ms = seconds(time_window_secs).num_milliseconds();
        let total_dec = Decimal::from(total);
        let mut allocated = 0u64;

        volume_profile
            .iter()
            .enumerate()
            .map(|(i, weight)| {
                let remaining = total - allocated;
                let quantity = if i + 1 == volume_profile.len() {
                    remaining
                } else {
                    (total_dec * *weight / weight_sum)
                        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                        .to_u64()
                        .unwrap_or(remaining)
                        .min(remaining)
                };
                allocated += quantity;
                PlannedSlice::at(offset_time(start, window_ms, i as u64, n), quantity)
            })
            .collect()
    }
}
