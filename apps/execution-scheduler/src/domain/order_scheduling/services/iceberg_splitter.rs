//! Iceberg Splitter Domain Service
//!
//! Batch splitting for ICEBERG, TIMED_SPLIT and CLASSIC_ICEBERG.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;

use crate::domain::order_scheduling::value_objects::PlannedSlice;

/// Splits a total quantity into capped batches.
#[derive(Debug, Clone, Copy, Default)]
pub struct IcebergSplitter;

impl IcebergSplitter {
    /// `ceil(total / batch)` batches of `min(batch, remaining)`.
    #[must_use]
    pub fn fixed(total: u64, batch_size: u64) -> Vec<PlannedSlice> {
        Self::batches(total, batch_size)
            .map(PlannedSlice::immediate)
            .collect()
    }

    /// Fixed batches, batch `i` released at `start + i * interval`.
    #[must_use]
    pub fn timed(
        total: u64,
        per_order_volume: u64,
        interval_secs: u64,
        start: DateTime<Utc>,
    ) -> Vec<PlannedSlice> {
        let interval = seconds(interval_secs);
        let mut time = start;
        Self::batches(total, per_order_volume)
            .map(|quantity| {
                let slice = PlannedSlice::at(time, quantity);
                time = time
                    .checked_add_signed(interval)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                slice
            })
            .collect()
    }

    /// Batches perturbed by up to `±ratio` of `batch_size`, with an optional
    /// price offset of up to `±offset_ticks` ticks.
    ///
    /// Each batch is clamped to `[1, remaining]`; the last batch takes
    /// whatever is left so the total is exact.
    pub fn randomized<R: Rng + ?Sized>(
        total: u64,
        batch_size: u64,
        ratio: f64,
        offset_ticks: u32,
        price_tick: Decimal,
        rng: &mut R,
    ) -> Vec<PlannedSlice> {
        let mut slices = Vec::new();
        let mut remaining = total;

        while remaining > 0 {
            let drawn = if ratio > 0.0 {
                scale(batch_size, 1.0 + rng.random_range(-ratio..=ratio))
            } else {
                batch_size
            };
            let quantity = drawn.clamp(1, remaining);
            remaining -= quantity;

            let price_offset = (offset_ticks > 0).then(|| {
                let ticks = i64::from(offset_ticks);
                Decimal::from(rng.random_range(-ticks..=ticks)) * price_tick
            });

            slices.push(PlannedSlice {
                quantity,
                scheduled_time: None,
                price_offset,
            });
        }

        slices
    }

    fn batches(total: u64, batch_size: u64) -> impl Iterator<Item = u64> {
        let batch_size = batch_size.max(1);
        let mut remaining = total;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let quantity = batch_size.min(remaining);
            remaining -= quantity;
            Some(quantity)
        })
    }
}

/// Whole seconds as a duration, saturating at the largest representable span.
pub(crate) fn seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

fn scale(batch_size: u64, factor: f64) -> u64 {
    (batch_size as f64 * factor).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    fn quantities(slices: &[PlannedSlice]) -> Vec<u64> {
        slices.iter().map(|s| s.quantity).collect()
    }

    #[test]
    fn fixed_splits_with_remainder_last() {
        let slices = IcebergSplitter::fixed(25, 10);
        assert_eq!(quantities(&slices), vec![10, 10, 5]);
        assert!(slices.iter().all(|s| s.scheduled_time.is_none()));
    }

    #[test]
    fn fixed_batch_larger_than_total() {
        assert_eq!(quantities(&IcebergSplitter::fixed(3, 10)), vec![3]);
    }

    #[test]
    fn timed_split_example() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap();
        let slices = IcebergSplitter::timed(100, 30, 60, t0);

        assert_eq!(quantities(&slices), vec![30, 30, 30, 10]);
        let times: Vec<_> = slices.iter().filter_map(|s| s.scheduled_time).collect();
        assert_eq!(
            times,
            vec![
                t0,
                t0 + Duration::seconds(60),
                t0 + Duration::seconds(120),
                t0 + Duration::seconds(180),
            ]
        );
    }

    #[test]
    fn randomized_sums_exactly() {
        let mut rng = StdRng::seed_from_u64(7);
        let slices = IcebergSplitter::randomized(137, 10, 0.3, 2, dec!(0.2), &mut rng);

        assert_eq!(quantities(&slices).iter().sum::<u64>(), 137);
        for slice in &slices[..slices.len() - 1] {
            assert!((7..=13).contains(&slice.quantity), "{}", slice.quantity);
        }
    }

    #[test]
    fn randomized_price_offsets_are_whole_ticks_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let slices = IcebergSplitter::randomized(200, 10, 0.1, 2, dec!(0.2), &mut rng);

        for slice in &slices {
            let offset = slice.price_offset.unwrap();
            assert!(offset >= dec!(-0.4) && offset <= dec!(0.4));
            assert_eq!((offset / dec!(0.2)).fract(), Decimal::ZERO);
        }
    }

    #[test]
    fn zero_ratio_and_ticks_match_fixed_split() {
        let mut rng = StdRng::seed_from_u64(3);
        let slices = IcebergSplitter::randomized(25, 10, 0.0, 0, dec!(0.01), &mut rng);

        assert_eq!(slices, IcebergSplitter::fixed(25, 10));
    }
}
