//! Execution Coordinator
//!
//! Wires the scheduler and the adaptive executor together: releases due
//! children, prices them, hands venue submissions to the executor for
//! supervision, and routes fills and timeouts back. It never talks to the
//! venue; it only returns instructions and events.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::application::state::EngineSnapshot;
use crate::domain::adaptive_execution::{
    AdaptiveExecutor, ManagedOrder, OrderExecutionConfig, RetryInstruction, round_price_to_tick,
};
use crate::domain::events::ExecutionEvent;
use crate::domain::order_scheduling::{
    AdvancedOrder, AdvancedOrderParams, AdvancedOrderScheduler, AdvancedSchedulerConfig,
    AlgorithmKind, ChildOrder, ScheduleError,
};
use crate::domain::shared::{AdvancedOrderId, ChildOrderId, ContractId, VenueOrderId};
use crate::domain::trading::{Quote, TradeInstruction};
use crate::observability;

/// A priced child order ready for the venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyChild {
    /// Child being released.
    pub child_id: ChildOrderId,
    /// Parent order.
    pub order_id: AdvancedOrderId,
    /// Priced instruction to submit.
    pub instruction: TradeInstruction,
}

/// Result of a timeout sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeoutOutcome {
    /// Venue orders to cancel.
    pub cancel_ids: Vec<VenueOrderId>,
    /// Repriced resubmissions to send.
    pub retries: Vec<RetryInstruction>,
    /// Timeout and exhaustion events.
    pub events: Vec<ExecutionEvent>,
}

/// Result of cancelling an advanced order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderCancellation {
    /// Children that were working when the order was cancelled.
    pub child_ids: Vec<ChildOrderId>,
    /// Venue orders to cancel for those children.
    pub venue_ids: Vec<VenueOrderId>,
    /// The cancellation event.
    pub events: Vec<ExecutionEvent>,
}

/// Coordinates the scheduler and the adaptive executor.
#[derive(Debug)]
pub struct ExecutionCoordinator {
    scheduler: AdvancedOrderScheduler,
    executor: AdaptiveExecutor,
}

impl ExecutionCoordinator {
    /// Create a coordinator over the two components.
    #[must_use]
    pub const fn new(scheduler: AdvancedOrderScheduler, executor: AdaptiveExecutor) -> Self {
        Self {
            scheduler,
            executor,
        }
    }

    /// Create a coordinator with empty components.
    #[must_use]
    pub fn with_config(
        scheduler_config: AdvancedSchedulerConfig,
        executor_config: OrderExecutionConfig,
    ) -> Self {
        Self::new(
            AdvancedOrderScheduler::new(scheduler_config),
            AdaptiveExecutor::new(executor_config),
        )
    }

    /// The scheduling engine.
    #[must_use]
    pub const fn scheduler(&self) -> &AdvancedOrderScheduler {
        &self.scheduler
    }

    /// The adaptive executor.
    #[must_use]
    pub const fn executor(&self) -> &AdaptiveExecutor {
        &self.executor
    }

    /// Submit an advanced order to the scheduler.
    pub fn submit(
        &mut self,
        kind: AlgorithmKind,
        instruction: TradeInstruction,
        params: &AdvancedOrderParams,
        now: DateTime<Utc>,
    ) -> Result<AdvancedOrder, ScheduleError> {
        let contract = instruction.contract.clone();
        let order = self
            .scheduler
            .submit(kind, instruction, params, now)
            .inspect_err(|e| {
                tracing::warn!(kind = %kind, contract = %contract, error = %e, "Advanced order rejected");
            })?;

        observability::record_advanced_order_submitted(kind);
        tracing::info!(
            order_id = %order.id(),
            kind = %kind,
            contract = %contract,
            total_qty = order.total_qty(),
            children = order.children().len(),
            "Advanced order accepted"
        );
        Ok(order)
    }

    /// Release due children priced against one quote.
    pub fn process_due(
        &mut self,
        now: DateTime<Utc>,
        bid: Decimal,
        ask: Decimal,
        tick: Decimal,
    ) -> Vec<ReadyChild> {
        let quote = Quote::new(bid, ask, tick);
        self.process_due_with(now, |_| quote)
    }

    /// Release due children, pricing each against its contract's quote.
    ///
    /// A child's randomized price offset is added on top of the adaptive
    /// price and the result re-rounded to the tick.
    pub fn process_due_with<F>(&mut self, now: DateTime<Utc>, quote_for: F) -> Vec<ReadyChild>
    where
        F: Fn(&ContractId) -> Quote,
    {
        let due = self.scheduler.due_children(now);
        let ready: Vec<_> = due
            .iter()
            .map(|child| {
                let quote = quote_for(&child.instruction().contract);
                ReadyChild {
                    child_id: child.id().clone(),
                    order_id: child.parent_id().clone(),
                    instruction: self.priced(child, &quote),
                }
            })
            .collect();

        for child in &due {
            tracing::debug!(
                child_id = %child.id(),
                order_id = %child.parent_id(),
                quantity = child.quantity(),
                "Child order released"
            );
        }
        self.record_releases(&due);
        ready
    }

    fn priced(&self, child: &ChildOrder, quote: &Quote) -> TradeInstruction {
        let instruction = child.instruction();
        let mut price = self
            .executor
            .price(instruction, quote.bid, quote.ask, quote.tick);

        if let Some(offset) = child.price_offset().filter(|o| !o.is_zero()) {
            price = round_price_to_tick(price + offset, quote.tick);
            if quote.tick > Decimal::ZERO {
                price = price.max(quote.tick);
            }
        }
        instruction.with_price(price)
    }

    fn record_releases(&self, due: &[ChildOrder]) {
        for child in due {
            if let Some(order) = self.scheduler.get_order(child.parent_id()) {
                observability::record_child_orders_released(order.kind(), 1);
            }
        }
    }

    /// A child reached the venue; start timeout supervision.
    pub fn on_submitted(
        &mut self,
        child_id: &ChildOrderId,
        venue_id: VenueOrderId,
        instruction: TradeInstruction,
        now: DateTime<Utc>,
    ) -> ManagedOrder {
        tracing::debug!(child_id = %child_id, venue_id = %venue_id, price = %instruction.price, "Child order submitted");
        self.executor
            .register_correlated(venue_id, instruction, child_id.as_str(), now)
    }

    /// A retry reached the venue; keep supervising the chain.
    pub fn on_retry_submitted(
        &mut self,
        venue_id: VenueOrderId,
        retry: RetryInstruction,
        now: DateTime<Utc>,
    ) -> ManagedOrder {
        tracing::info!(
            venue_id = %venue_id,
            attempt = retry.attempt,
            price = %retry.instruction.price,
            original_price = %retry.original_price,
            "Retry submitted"
        );
        self.executor.register_retry(venue_id, retry, now)
    }

    /// The venue rejected a released child; release it again on a later tick.
    pub fn on_submit_failed(&mut self, child_id: &ChildOrderId, now: DateTime<Utc>) -> bool {
        let requeued = self.scheduler.requeue_child(child_id, now);
        if requeued {
            tracing::warn!(child_id = %child_id, "Child order requeued after failed submission");
        } else {
            tracing::debug!(child_id = %child_id, "Failed submission for inactive child ignored");
        }
        requeued
    }

    /// The venue rejected a retry. The chain is gone from the executor, so
    /// its child goes back to the scheduler and is priced afresh.
    pub fn on_retry_failed(&mut self, retry: &RetryInstruction, now: DateTime<Utc>) -> bool {
        match retry.correlation_id.as_deref() {
            Some(child_id) => self.on_submit_failed(&ChildOrderId::new(child_id), now),
            None => false,
        }
    }

    /// Sweep for timed-out orders and prepare a retry for each, walking
    /// the price by `tick`.
    pub fn on_timeout_tick(&mut self, now: DateTime<Utc>, tick: Decimal) -> TimeoutOutcome {
        self.on_timeout_tick_with(now, |_| tick)
    }

    /// Sweep for timed-out orders, using each contract's own tick size.
    pub fn on_timeout_tick_with<F>(&mut self, now: DateTime<Utc>, tick_for: F) -> TimeoutOutcome
    where
        F: Fn(&ContractId) -> Decimal,
    {
        let sweep = self.executor.check_timeouts(now);
        let mut retries = Vec::new();
        let mut events = sweep.events;

        for venue_id in &sweep.cancel_ids {
            observability::record_order_timeout();
            tracing::warn!(venue_id = %venue_id, "Order timed out");

            let tick = self
                .executor
                .get_order(venue_id)
                .map_or(Decimal::ZERO, |o| tick_for(&o.instruction().contract));
            let decision = self.executor.prepare_retry(venue_id, tick, now);
            if let Some(retry) = decision.retry {
                observability::record_order_retry();
                retries.push(retry);
            }
            for event in &decision.events {
                if let ExecutionEvent::RetryExhausted(exhausted) = event {
                    observability::record_retries_exhausted();
                    tracing::warn!(
                        venue_id = %exhausted.venue_id,
                        contract = %exhausted.symbol,
                        total_retries = exhausted.total_retries,
                        original_price = %exhausted.original_price,
                        final_price = %exhausted.final_price,
                        "Retries exhausted"
                    );
                }
            }
            events.extend(decision.events);
        }

        TimeoutOutcome {
            cancel_ids: sweep.cancel_ids,
            retries,
            events,
        }
    }

    /// A child was reported filled.
    pub fn on_filled(&mut self, child_id: &ChildOrderId, now: DateTime<Utc>) -> Vec<ExecutionEvent> {
        let events = self.scheduler.on_child_filled(child_id, now);
        if events.is_empty() && self.scheduler.order_for_child(child_id).is_none() {
            tracing::debug!(child_id = %child_id, "Fill for unknown child ignored");
        }
        self.record_lifecycle(&events);
        events
    }

    /// A venue order was reported filled.
    ///
    /// Stops supervising it and, when it belongs to a child, forwards the fill.
    pub fn on_venue_filled(&mut self, venue_id: &VenueOrderId, now: DateTime<Utc>) -> Vec<ExecutionEvent> {
        let Some(order) = self.executor.mark_filled(venue_id) else {
            tracing::debug!(venue_id = %venue_id, "Fill for unknown venue order ignored");
            return Vec::new();
        };
        match order.correlation_id() {
            Some(child_id) => self.on_filled(&ChildOrderId::new(child_id), now),
            None => Vec::new(),
        }
    }

    /// Cancel an advanced order and stop supervising its working children.
    pub fn cancel(&mut self, order_id: &AdvancedOrderId, now: DateTime<Utc>) -> OrderCancellation {
        let outcome = self.scheduler.cancel(order_id, now);
        if outcome.events.is_empty() {
            tracing::debug!(order_id = %order_id, "Cancel for unknown or finished order ignored");
            return OrderCancellation::default();
        }

        let venue_ids: Vec<_> = self
            .executor
            .active_orders()
            .into_iter()
            .filter(|o| {
                o.correlation_id()
                    .is_some_and(|c| outcome.cancel_child_ids.iter().any(|id| id.as_str() == c))
            })
            .map(|o| o.venue_id().clone())
            .collect();
        for venue_id in &venue_ids {
            self.executor.mark_cancelled(venue_id);
        }

        self.record_lifecycle(&outcome.events);
        OrderCancellation {
            child_ids: outcome.cancel_child_ids,
            venue_ids,
            events: outcome.events,
        }
    }

    fn record_lifecycle(&self, events: &[ExecutionEvent]) {
        for event in events {
            let Some(kind) = event.algorithm_kind() else {
                continue;
            };
            match event {
                ExecutionEvent::IcebergComplete(e)
                | ExecutionEvent::TwapComplete(e)
                | ExecutionEvent::VwapComplete(e)
                | ExecutionEvent::TimedSplitComplete(e)
                | ExecutionEvent::ClassicIcebergComplete(e)
                | ExecutionEvent::EnhancedTwapComplete(e) => {
                    observability::record_advanced_order_completed(kind);
                    tracing::info!(order_id = %e.order_id, kind = %kind, filled_qty = e.filled_qty, "Advanced order completed");
                }
                ExecutionEvent::IcebergCancelled(e)
                | ExecutionEvent::TwapCancelled(e)
                | ExecutionEvent::VwapCancelled(e)
                | ExecutionEvent::TimedSplitCancelled(e)
                | ExecutionEvent::ClassicIcebergCancelled(e)
                | ExecutionEvent::EnhancedTwapCancelled(e) => {
                    observability::record_advanced_order_cancelled(kind);
                    tracing::info!(
                        order_id = %e.order_id,
                        kind = %kind,
                        filled_qty = e.filled_qty,
                        remaining_qty = e.remaining_qty,
                        "Advanced order cancelled"
                    );
                }
                ExecutionEvent::OrderTimeout(_) | ExecutionEvent::RetryExhausted(_) => {}
            }
        }
    }

    /// Drop completed and cancelled orders from the scheduler.
    pub fn prune_terminal(&mut self) -> usize {
        self.scheduler.prune_terminal()
    }

    /// Capture the engine state.
    #[must_use]
    pub fn snapshot(&self, now: DateTime<Utc>) -> EngineSnapshot {
        EngineSnapshot::new(now, self.scheduler.snapshot(), self.executor.snapshot())
    }

    /// Rebuild the engine from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: EngineSnapshot) -> Self {
        Self::new(
            AdvancedOrderScheduler::from_snapshot(snapshot.scheduler),
            AdaptiveExecutor::from_snapshot(snapshot.executor),
        )
    }
}
