//! Advanced Order Scheduler Domain Service
//!
//! Owns every advanced order, splits new requests into child orders, decides
//! which children are due, and tracks fill progress.
//!
//! All calls are synchronous and take the current time from the caller.
//! Nothing here sleeps or blocks.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::{IcebergSplitter, TwapSplitter, VwapSplitter};
use crate::domain::events::ExecutionEvent;
use crate::domain::order_scheduling::errors::ScheduleError;
use crate::domain::order_scheduling::value_objects::{
    AdvancedOrder, AdvancedOrderParams, AdvancedOrderRequest, AdvancedSchedulerConfig,
    AlgorithmKind, ChildOrder, FillOutcome, PlannedSlice, SplitPlan,
};
use crate::domain::shared::{AdvancedOrderId, ChildOrderId};
use crate::domain::trading::TradeInstruction;

/// Result of cancelling an advanced order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelOutcome {
    /// Submitted-but-unfilled children to cancel at the venue.
    pub cancel_child_ids: Vec<ChildOrderId>,
    /// The cancellation event (empty if nothing was cancelled).
    pub events: Vec<ExecutionEvent>,
}

/// Persistable scheduler state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    /// Scheduler defaults.
    pub config: AdvancedSchedulerConfig,
    /// Every tracked order, keyed by id.
    pub orders: BTreeMap<AdvancedOrderId, AdvancedOrder>,
}

/// The scheduling engine.
#[derive(Debug)]
pub struct AdvancedOrderScheduler {
    config: AdvancedSchedulerConfig,
    orders: HashMap<AdvancedOrderId, AdvancedOrder>,
    child_index: HashMap<ChildOrderId, AdvancedOrderId>,
    rng: StdRng,
}

impl AdvancedOrderScheduler {
    /// Create a scheduler with an entropy-seeded random source.
    #[must_use]
    pub fn new(config: AdvancedSchedulerConfig) -> Self {
        Self::with_rng(config, StdRng::from_rng(&mut rand::rng()))
    }

    /// Create a scheduler with a fixed seed, for reproducible randomized splits.
    #[must_use]
    pub fn with_seed(config: AdvancedSchedulerConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: AdvancedSchedulerConfig, rng: StdRng) -> Self {
        Self {
            config,
            orders: HashMap::new(),
            child_index: HashMap::new(),
            rng,
        }
    }

    /// Scheduler defaults.
    #[must_use]
    pub const fn config(&self) -> &AdvancedSchedulerConfig {
        &self.config
    }

    /// Validate and split a request into a new advanced order.
    ///
    /// Time-sliced schedules start at `now`. A rejected request leaves no
    /// state behind.
    pub fn submit(
        &mut self,
        kind: AlgorithmKind,
        instruction: TradeInstruction,
        params: &AdvancedOrderParams,
        now: DateTime<Utc>,
    ) -> Result<AdvancedOrder, ScheduleError> {
        if instruction.quantity == 0 {
            return Err(ScheduleError::InvalidQuantity {
                quantity: instruction.quantity,
            });
        }
        let (resolved, plan) = params.resolve(kind, &self.config)?;

        let slices = self.plan_slices(instruction.quantity, &plan, now);
        let id = AdvancedOrderId::generate();
        let request = AdvancedOrderRequest {
            kind,
            instruction,
            params: resolved,
        };
        let order = AdvancedOrder::new(id.clone(), request, &slices, now);

        for child in order.children() {
            self.child_index.insert(child.id().clone(), id.clone());
        }
        self.orders.insert(id, order.clone());
        Ok(order)
    }

    fn plan_slices(&mut self, total: u64, plan: &SplitPlan, now: DateTime<Utc>) -> Vec<PlannedSlice> {
        match plan {
            SplitPlan::Iceberg { batch_size } => IcebergSplitter::fixed(total, *batch_size),
            SplitPlan::TimedSplit {
                interval_secs,
                per_order_volume,
            } => IcebergSplitter::timed(total, *per_order_volume, *interval_secs, now),
            SplitPlan::ClassicIceberg {
                batch_size,
                randomize_ratio,
                price_offset_ticks,
                price_tick,
            } => IcebergSplitter::randomized(
                total,
                *batch_size,
                *randomize_ratio,
                *price_offset_ticks,
                *price_tick,
                &mut self.rng,
            ),
            SplitPlan::Twap {
                time_window_secs,
                num_slices,
            } => TwapSplitter::split(total, *num_slices, *time_window_secs, now),
            SplitPlan::Vwap {
                time_window_secs,
                volume_profile,
            } => VwapSplitter::split(total, volume_profile, *time_window_secs, now),
        }
    }

    /// Children eligible for submission at `now`, marked submitted.
    ///
    /// Orders are visited oldest first; within an order children come in
    /// slice order.
    pub fn due_children(&mut self, now: DateTime<Utc>) -> Vec<ChildOrder> {
        let mut ids: Vec<_> = self
            .orders
            .values()
            .filter(|o| !o.is_terminal())
            .map(|o| (o.created_at(), o.id().clone()))
            .collect();
        ids.sort();

        let mut released = Vec::new();
        for (_, id) in ids {
            if let Some(order) = self.orders.get_mut(&id) {
                released.extend(order.release_due(now));
            }
        }
        released
    }

    /// Put a released child back so a later `due_children` releases it again.
    ///
    /// Used when the venue never accepted the child. Returns whether the
    /// child was requeued.
    pub fn requeue_child(&mut self, child_id: &ChildOrderId, now: DateTime<Utc>) -> bool {
        self.child_index
            .get(child_id)
            .and_then(|order_id| self.orders.get_mut(order_id))
            .is_some_and(|order| order.requeue(child_id, now))
    }

    /// Record a fill for `child_id`.
    ///
    /// Returns the completion event when this fill completes its order.
    /// Unknown and duplicate reports are no-ops.
    pub fn on_child_filled(
        &mut self,
        child_id: &ChildOrderId,
        now: DateTime<Utc>,
    ) -> Vec<ExecutionEvent> {
        let Some(order) = self
            .child_index
            .get(child_id)
            .and_then(|order_id| self.orders.get_mut(order_id))
        else {
            return Vec::new();
        };

        match order.apply_fill(child_id, now) {
            Some(FillOutcome::Applied { event }) => event.into_iter().collect(),
            Some(FillOutcome::Duplicate) | None => Vec::new(),
        }
    }

    /// Cancel an advanced order.
    ///
    /// Unknown or already-terminal orders yield an empty outcome.
    pub fn cancel(&mut self, order_id: &AdvancedOrderId, now: DateTime<Utc>) -> CancelOutcome {
        self.orders
            .get_mut(order_id)
            .and_then(|order| order.cancel(now))
            .map(|(cancel_child_ids, event)| CancelOutcome {
                cancel_child_ids,
                events: vec![event],
            })
            .unwrap_or_default()
    }

    /// Look up an order.
    #[must_use]
    pub fn get_order(&self, order_id: &AdvancedOrderId) -> Option<&AdvancedOrder> {
        self.orders.get(order_id)
    }

    /// The order a child belongs to.
    #[must_use]
    pub fn order_for_child(&self, child_id: &ChildOrderId) -> Option<&AdvancedOrder> {
        self.child_index
            .get(child_id)
            .and_then(|order_id| self.orders.get(order_id))
    }

    /// All tracked orders, oldest first.
    #[must_use]
    pub fn orders(&self) -> Vec<&AdvancedOrder> {
        let mut orders: Vec<_> = self.orders.values().collect();
        orders.sort_by(|a, b| (a.created_at(), a.id()).cmp(&(b.created_at(), b.id())));
        orders
    }

    /// Orders that are neither completed nor cancelled, oldest first.
    #[must_use]
    pub fn active_orders(&self) -> Vec<&AdvancedOrder> {
        self.orders()
            .into_iter()
            .filter(|o| !o.is_terminal())
            .collect()
    }

    /// Drop completed and cancelled orders. Returns how many were removed.
    pub fn prune_terminal(&mut self) -> usize {
        let before = self.orders.len();
        self.orders.retain(|_, order| !order.is_terminal());
        let orders = &self.orders;
        self.child_index
            .retain(|_, order_id| orders.contains_key(order_id));
        before - self.orders.len()
    }

    /// Capture the scheduler state.
    #[must_use]
    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            config: self.config.clone(),
            orders: self
                .orders
                .iter()
                .map(|(id, order)| (id.clone(), order.clone()))
                .collect(),
        }
    }

    /// Rebuild a scheduler from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: SchedulerSnapshot) -> Self {
        let mut scheduler = Self::new(snapshot.config);
        for (id, order) in snapshot.orders {
            for child in order.children() {
                scheduler.child_index.insert(child.id().clone(), id.clone());
            }
            scheduler.orders.insert(id, order);
        }
        scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_scheduling::value_objects::AdvancedOrderStatus;
    use crate::domain::shared::ContractId;
    use crate::domain::trading::{Direction, Offset};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap()
    }

    fn instruction(quantity: u64) -> TradeInstruction {
        TradeInstruction::limit(
            ContractId::new("rb2510.SHFE"),
            Direction::Sell,
            Offset::Close,
            quantity,
            dec!(3500),
        )
    }

    fn scheduler() -> AdvancedOrderScheduler {
        AdvancedOrderScheduler::with_seed(AdvancedSchedulerConfig::default(), 42)
    }

    fn fill_all(scheduler: &mut AdvancedOrderScheduler, children: &[ChildOrder]) -> Vec<ExecutionEvent> {
        children
            .iter()
            .flat_map(|c| scheduler.on_child_filled(c.id(), t0()))
            .collect()
    }

    #[test]
    fn submit_timed_split_example() {
        let mut scheduler = scheduler();
        let order = scheduler
            .submit(
                AlgorithmKind::TimedSplit,
                instruction(100),
                &AdvancedOrderParams::timed_split(60, 30),
                t0(),
            )
            .unwrap();

        let sizes: Vec<_> = order.children().iter().map(|c| c.quantity()).collect();
        assert_eq!(sizes, vec![30, 30, 30, 10]);
        let times: Vec<_> = order.slice_schedule().iter().map(|e| e.time).collect();
        assert_eq!(
            times,
            (0..4).map(|i| t0() + Duration::seconds(60 * i)).collect::<Vec<_>>()
        );
        assert_eq!(order.status(), AdvancedOrderStatus::Pending);
    }

    #[test]
    fn submit_rejects_zero_quantity_without_state() {
        let mut scheduler = scheduler();
        let err = scheduler
            .submit(
                AlgorithmKind::Iceberg,
                instruction(0),
                &AdvancedOrderParams::iceberg(10),
                t0(),
            )
            .unwrap_err();

        assert_eq!(err, ScheduleError::InvalidQuantity { quantity: 0 });
        assert!(scheduler.orders().is_empty());
    }

    #[test]
    fn submit_rejects_invalid_params_without_state() {
        let mut scheduler = scheduler();
        let result = scheduler.submit(
            AlgorithmKind::Twap,
            instruction(10),
            &AdvancedOrderParams::twap(60, 0),
            t0(),
        );

        assert!(result.is_err());
        assert!(scheduler.orders().is_empty());
        assert!(scheduler.due_children(t0()).is_empty());
    }

    #[test]
    fn submit_records_resolved_params() {
        let mut scheduler = scheduler();
        let order = scheduler
            .submit(
                AlgorithmKind::Iceberg,
                instruction(25),
                &AdvancedOrderParams::default(),
                t0(),
            )
            .unwrap();

        assert_eq!(order.request().params.batch_size, Some(10));
        assert_eq!(order.children().len(), 3);
    }

    #[test]
    fn iceberg_reveals_sequentially_and_completes_once() {
        let mut scheduler = scheduler();
        let order = scheduler
            .submit(
                AlgorithmKind::Iceberg,
                instruction(25),
                &AdvancedOrderParams::iceberg(10),
                t0(),
            )
            .unwrap();

        let mut events = Vec::new();
        for expected in [10, 10, 5] {
            let due = scheduler.due_children(t0());
            assert_eq!(due.len(), 1);
            assert_eq!(due[0].quantity(), expected);
            assert!(scheduler.due_children(t0()).is_empty());
            events.extend(fill_all(&mut scheduler, &due));
        }

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "ICEBERG_COMPLETE");
        let order = scheduler.get_order(order.id()).unwrap();
        assert_eq!(order.status(), AdvancedOrderStatus::Completed);
        assert_eq!(order.filled_qty(), 25);
    }

    #[test]
    fn due_children_visits_orders_oldest_first() {
        let mut scheduler = scheduler();
        let later = scheduler
            .submit(
                AlgorithmKind::Iceberg,
                instruction(4),
                &AdvancedOrderParams::iceberg(2),
                t0() + Duration::seconds(1),
            )
            .unwrap();
        let earlier = scheduler
            .submit(
                AlgorithmKind::Twap,
                instruction(6),
                &AdvancedOrderParams::twap(60, 2),
                t0(),
            )
            .unwrap();

        let due = scheduler.due_children(t0() + Duration::seconds(30));

        let parents: Vec<_> = due.iter().map(|c| c.parent_id().clone()).collect();
        assert_eq!(
            parents,
            vec![earlier.id().clone(), earlier.id().clone(), later.id().clone()]
        );
    }

    #[test]
    fn requeued_reveal_child_is_released_again() {
        let mut scheduler = scheduler();
        scheduler
            .submit(
                AlgorithmKind::Iceberg,
                instruction(20),
                &AdvancedOrderParams::iceberg(10),
                t0(),
            )
            .unwrap();

        let first = scheduler.due_children(t0());
        assert!(scheduler.due_children(t0()).is_empty());
        assert!(scheduler.requeue_child(first[0].id(), t0()));

        let again = scheduler.due_children(t0());
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].id(), first[0].id());

        fill_all(&mut scheduler, &again);
        assert_eq!(scheduler.due_children(t0())[0].quantity(), 10);
    }

    #[test]
    fn requeue_ignores_unreleased_filled_and_unknown_children() {
        let mut scheduler = scheduler();
        let order = scheduler
            .submit(
                AlgorithmKind::Twap,
                instruction(10),
                &AdvancedOrderParams::twap(100, 2),
                t0(),
            )
            .unwrap();
        let pending = order.children()[1].id().clone();
        assert!(!scheduler.requeue_child(&pending, t0()));

        let due = scheduler.due_children(t0());
        fill_all(&mut scheduler, &due);
        assert!(!scheduler.requeue_child(due[0].id(), t0()));
        assert!(!scheduler.requeue_child(&ChildOrderId::new("missing"), t0()));
    }

    #[test]
    fn classic_iceberg_keeps_one_child_working() {
        let mut scheduler = scheduler();
        scheduler
            .submit(
                AlgorithmKind::ClassicIceberg,
                instruction(60),
                &AdvancedOrderParams::classic_iceberg(10, 0.3, 1, dec!(1)),
                t0(),
            )
            .unwrap();

        let mut total = 0;
        loop {
            let due = scheduler.due_children(t0());
            if due.is_empty() {
                break;
            }
            assert_eq!(due.len(), 1);
            assert!(scheduler.due_children(t0()).is_empty());
            total += due[0].quantity();
            fill_all(&mut scheduler, &due);
        }
        assert_eq!(total, 60);
    }

    #[test]
    fn twap_releases_slices_over_time() {
        let mut scheduler = scheduler();
        scheduler
            .submit(
                AlgorithmKind::EnhancedTwap,
                instruction(10),
                &AdvancedOrderParams::twap(300, 3),
                t0(),
            )
            .unwrap();

        assert_eq!(scheduler.due_children(t0()).len(), 1);
        assert!(scheduler.due_children(t0() + Duration::seconds(99)).is_empty());
        let due = scheduler.due_children(t0() + Duration::seconds(200));
        let sizes: Vec<_> = due.iter().map(|c| c.quantity()).collect();
        assert_eq!(sizes, vec![3, 3]);
    }

    #[test]
    fn unknown_and_duplicate_fills_are_ignored() {
        let mut scheduler = scheduler();
        scheduler
            .submit(
                AlgorithmKind::Iceberg,
                instruction(20),
                &AdvancedOrderParams::iceberg(10),
                t0(),
            )
            .unwrap();
        let due = scheduler.due_children(t0());

        assert!(scheduler
            .on_child_filled(&ChildOrderId::new("nope"), t0())
            .is_empty());
        fill_all(&mut scheduler, &due);
        fill_all(&mut scheduler, &due);

        assert_eq!(scheduler.orders()[0].filled_qty(), 10);
    }

    #[test]
    fn cancel_partially_filled_order() {
        let mut scheduler = scheduler();
        let order = scheduler
            .submit(
                AlgorithmKind::Twap,
                instruction(40),
                &AdvancedOrderParams::twap(400, 4),
                t0(),
            )
            .unwrap();
        let due = scheduler.due_children(t0() + Duration::seconds(100));
        scheduler.on_child_filled(due[0].id(), t0());

        let outcome = scheduler.cancel(order.id(), t0());

        assert_eq!(outcome.cancel_child_ids, vec![due[1].id().clone()]);
        let ExecutionEvent::TwapCancelled(event) = &outcome.events[0] else {
            panic!("unexpected {:?}", outcome.events);
        };
        assert_eq!(event.filled_qty + event.remaining_qty, 40);
        assert_eq!(event.filled_qty, 10);

        assert_eq!(scheduler.cancel(order.id(), t0()), CancelOutcome::default());
        assert!(scheduler.due_children(t0() + Duration::seconds(400)).is_empty());
    }

    #[test]
    fn cancel_unknown_order_is_empty() {
        let mut scheduler = scheduler();
        let outcome = scheduler.cancel(&AdvancedOrderId::new("missing"), t0());
        assert_eq!(outcome, CancelOutcome::default());
    }

    #[test]
    fn queries_and_prune() {
        let mut scheduler = scheduler();
        let done = scheduler
            .submit(
                AlgorithmKind::Iceberg,
                instruction(5),
                &AdvancedOrderParams::iceberg(10),
                t0(),
            )
            .unwrap();
        let open = scheduler
            .submit(
                AlgorithmKind::Iceberg,
                instruction(5),
                &AdvancedOrderParams::iceberg(10),
                t0() + Duration::seconds(1),
            )
            .unwrap();

        let due = scheduler.due_children(t0() + Duration::seconds(1));
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].parent_id(), done.id());
        scheduler.on_child_filled(due[0].id(), t0());

        assert_eq!(
            scheduler.order_for_child(due[1].id()).map(|o| o.id()),
            Some(open.id())
        );
        assert_eq!(scheduler.active_orders().len(), 1);
        assert_eq!(scheduler.prune_terminal(), 1);
        assert!(scheduler.get_order(done.id()).is_none());
        assert!(scheduler.order_for_child(due[0].id()).is_none());
        assert_eq!(scheduler.orders().len(), 1);
    }

    #[test]
    fn snapshot_restore_reproduces_behaviour() {
        let mut scheduler = scheduler();
        scheduler
            .submit(
                AlgorithmKind::TimedSplit,
                instruction(100),
                &AdvancedOrderParams::timed_split(60, 30),
                t0(),
            )
            .unwrap();
        let first = scheduler.due_children(t0());
        scheduler.on_child_filled(first[0].id(), t0());

        let json = serde_json::to_string(&scheduler.snapshot()).unwrap();
        let mut restored =
            AdvancedOrderScheduler::from_snapshot(serde_json::from_str(&json).unwrap());

        let later = t0() + Duration::seconds(120);
        assert_eq!(restored.due_children(later), scheduler.due_children(later));
        assert_eq!(restored.orders()[0].filled_qty(), 30);
        assert_eq!(
            restored.on_child_filled(first[0].id(), t0()),
            scheduler.on_child_filled(first[0].id(), t0())
        );
    }
}
