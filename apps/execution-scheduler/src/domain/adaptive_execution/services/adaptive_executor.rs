//! Adaptive Executor Domain Service
//!
//! Market-aware limit pricing plus timeout and price-walk retry supervision
//! for venue orders. Independent of the scheduler.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::adaptive_execution::value_objects::{
    ManagedOrder, OrderExecutionConfig, RetryDecision, RetryInstruction, TimeoutSweep,
};
use crate::domain::events::{ExecutionEvent, OrderTimedOut, RetriesExhausted};
use crate::domain::shared::VenueOrderId;
use crate::domain::trading::{Direction, TradeInstruction};

/// Round `price` to the nearest multiple of `tick`, halves away from zero.
///
/// A non-positive tick leaves the price unchanged.
#[must_use]
pub fn round_price_to_tick(price: Decimal, tick: Decimal) -> Decimal {
    if tick <= Decimal::ZERO {
        return price;
    }
    (price / tick).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) * tick
}

/// Persistable executor state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorSnapshot {
    /// Executor settings.
    pub config: OrderExecutionConfig,
    /// Supervised orders, keyed by venue id.
    pub orders: BTreeMap<VenueOrderId, ManagedOrder>,
}

/// Adaptive executor.
#[derive(Debug, Clone)]
pub struct AdaptiveExecutor {
    config: OrderExecutionConfig,
    orders: HashMap<VenueOrderId, ManagedOrder>,
}

impl AdaptiveExecutor {
    /// Create an executor with no supervised orders.
    #[must_use]
    pub fn new(config: OrderExecutionConfig) -> Self {
        Self {
            config,
            orders: HashMap::new(),
        }
    }

    /// Executor settings.
    #[must_use]
    pub const fn config(&self) -> &OrderExecutionConfig {
        &self.config
    }

    /// Limit price for `instruction` against the current quote.
    ///
    /// Sells price at `bid - slippage_ticks * tick`, buys at
    /// `ask + slippage_ticks * tick`, rounded to the tick and never below one
    /// tick. A non-positive tick or a missing (non-positive) quote on the
    /// relevant side returns the instruction's own price unchanged.
    #[must_use]
    pub fn price(
        &self,
        instruction: &TradeInstruction,
        bid: Decimal,
        ask: Decimal,
        tick: Decimal,
    ) -> Decimal {
        let touch = match instruction.direction {
            Direction::Sell => bid,
            Direction::Buy => ask,
        };
        if tick <= Decimal::ZERO || touch <= Decimal::ZERO {
            return instruction.price;
        }

        let slippage = Decimal::from(self.config.slippage_ticks) * tick;
        let raw = touch + instruction.direction.aggressive_sign() * slippage;
        round_price_to_tick(raw, tick).max(tick)
    }

    /// Begin timeout supervision of a first attempt.
    pub fn register(
        &mut self,
        venue_id: VenueOrderId,
        instruction: TradeInstruction,
        now: DateTime<Utc>,
    ) -> ManagedOrder {
        self.insert(ManagedOrder::new(venue_id, instruction, now, None))
    }

    /// Begin supervision of a first attempt tagged with `correlation_id`.
    pub fn register_correlated(
        &mut self,
        venue_id: VenueOrderId,
        instruction: TradeInstruction,
        correlation_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> ManagedOrder {
        self.insert(ManagedOrder::new(
            venue_id,
            instruction,
            now,
            Some(correlation_id.into()),
        ))
    }

    /// Begin supervision of a resubmitted retry, keeping its retry count and
    /// original price.
    pub fn register_retry(
        &mut self,
        venue_id: VenueOrderId,
        retry: RetryInstruction,
        now: DateTime<Utc>,
    ) -> ManagedOrder {
        self.insert(ManagedOrder::from_retry(venue_id, retry, now))
    }

    fn insert(&mut self, order: ManagedOrder) -> ManagedOrder {
        self.orders.insert(order.venue_id().clone(), order.clone());
        order
    }

    /// Flag every active order that has rested for at least the timeout.
    ///
    /// Flagged orders stop being supervised and produce one event each.
    pub fn check_timeouts(&mut self, now: DateTime<Utc>) -> TimeoutSweep {
        let timeout = self.config.timeout();
        let mut expired: Vec<_> = self
            .orders
            .values_mut()
            .filter(|o| o.is_active() && now - o.submit_time() >= timeout)
            .collect();
        expired.sort_by(|a, b| {
            (a.submit_time(), a.venue_id()).cmp(&(b.submit_time(), b.venue_id()))
        });

        let mut sweep = TimeoutSweep::default();
        for order in expired {
            order.deactivate();
            sweep.cancel_ids.push(order.venue_id().clone());
            sweep.events.push(ExecutionEvent::OrderTimeout(OrderTimedOut {
                venue_id: order.venue_id().clone(),
                symbol: order.instruction().contract.clone(),
                elapsed_ms: (now - order.submit_time()).num_milliseconds(),
                occurred_at: now,
            }));
        }
        sweep
    }

    /// Decide what follows a timed-out order and stop supervising it.
    ///
    /// With retries left, returns the instruction walked one tick in the
    /// aggressive direction (sells never below one tick). Otherwise returns
    /// exactly one exhaustion event. A non-positive `tick` falls back to the
    /// configured tick. Unknown ids yield an empty decision.
    pub fn prepare_retry(
        &mut self,
        venue_id: &VenueOrderId,
        tick: Decimal,
        now: DateTime<Utc>,
    ) -> RetryDecision {
        let Some(order) = self.orders.remove(venue_id) else {
            return RetryDecision::default();
        };

        let last = order.instruction();
        if order.retry_count() >= self.config.max_retries {
            return RetryDecision {
                retry: None,
                events: vec![ExecutionEvent::RetryExhausted(RetriesExhausted {
                    venue_id: venue_id.clone(),
                    symbol: last.contract.clone(),
                    total_retries: order.retry_count(),
                    original_price: order.original_price(),
                    final_price: last.price,
                    occurred_at: now,
                })],
            };
        }

        let tick = if tick > Decimal::ZERO {
            tick
        } else {
            self.config.price_tick
        };
        let walked = round_price_to_tick(last.price + last.direction.aggressive_sign() * tick, tick);
        let price = match last.direction {
            Direction::Sell => walked.max(tick),
            Direction::Buy => walked,
        };

        RetryDecision {
            retry: Some(RetryInstruction {
                instruction: last.with_price(price),
                attempt: order.retry_count() + 1,
                original_price: order.original_price(),
                correlation_id: order.correlation_id().map(str::to_string),
            }),
            events: Vec::new(),
        }
    }

    /// Stop supervising a filled order. Returns the order if it was known.
    pub fn mark_filled(&mut self, venue_id: &VenueOrderId) -> Option<ManagedOrder> {
        self.orders.remove(venue_id)
    }

    /// Stop supervising a cancelled order. Returns the order if it was known.
    pub fn mark_cancelled(&mut self, venue_id: &VenueOrderId) -> Option<ManagedOrder> {
        self.orders.remove(venue_id)
    }

    /// Look up a supervised order.
    #[must_use]
    pub fn get_order(&self, venue_id: &VenueOrderId) -> Option<&ManagedOrder> {
        self.orders.get(venue_id)
    }

    /// Orders still under timeout supervision, oldest first.
    #[must_use]
    pub fn active_orders(&self) -> Vec<&ManagedOrder> {
        let mut orders: Vec<_> = self.orders.values().filter(|o| o.is_active()).collect();
        orders.sort_by(|a, b| {
            (a.submit_time(), a.venue_id()).cmp(&(b.submit_time(), b.venue_id()))
        });
        orders
    }

    /// Capture the executor state.
    #[must_use]
    pub fn snapshot(&self) -> ExecutorSnapshot {
        ExecutorSnapshot {
            config: self.config.clone(),
            orders: self
                .orders
                .iter()
                .map(|(id, order)| (id.clone(), order.clone()))
                .collect(),
        }
    }

    /// Rebuild an executor from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: ExecutorSnapshot) -> Self {
        Self {
            config: snapshot.config,
            orders: snapshot.orders.into_iter().collect(),
        }
    }
}
