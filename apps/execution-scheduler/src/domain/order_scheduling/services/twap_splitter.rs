//! TWAP Splitter Domain Service

use chrono::{DateTime, Duration, Utc};

use super::iceberg_splitter::seconds;
use crate::domain::order_scheduling::value_objects::PlannedSlice;

/// Splits a total quantity into equal slices spread evenly across a window.
///
/// Used by TWAP and ENHANCED_TWAP.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwapSplitter;

impl TwapSplitter {
    /// `num_slices` slices of `floor(total / num_slices)`; the first
    /// `total % num_slices` slices get one extra unit.
    ///
    /// Slice `i` is scheduled at `start + i * window / num_slices`, computed
    /// in milliseconds. Every slice is returned, including zero-sized ones
    /// when `total < num_slices`.
    #[must_use]
    pub fn split(
        total: u64,
        num_slices: u32,
        time_window_secs: u64,
        start: DateTime<Utc>,
    ) -> Vec<PlannedSlice> {
        let n = u64::from(num_slices.max(1));
        let base = total / n;
        let extra = total % n;
        let window_ms = seconds(time_window_secs).num_milliseconds();

        (0..n)
            .map(|i| {
                let quantity = base + u64::from(i < extra);
                PlannedSlice::at(offset_time(start, window_ms, i, n), quantity)
            })
            .collect()
    }
}

/// `start + window_ms * i / n` milliseconds.
pub(crate) fn offset_time(start: DateTime<Utc>, window_ms: i64, i: u64, n: u64) -> DateTime<Utc> {
    let ms = i128::from(window_ms) * i128::from(i) / i128::from(n.max(1));
    let offset = i64::try_from(ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .unwrap_or(Duration::MAX);
    start
        .checked_add_signed(offset)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
