//! Advanced Order Aggregate
//!
//! One large trade request, its splitting algorithm, and the child orders it
//! was split into. Only the scheduler mutates it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AdvancedOrderParams, AlgorithmKind};
use crate::domain::events::{AdvancedOrderCancelled, AdvancedOrderCompleted, ExecutionEvent};
use crate::domain::shared::{AdvancedOrderId, ChildOrderId};
use crate::domain::trading::TradeInstruction;

/// Advanced order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvancedOrderStatus {
    /// Accepted, no child released yet.
    Pending,
    /// At least one child released.
    Executing,
    /// Every child filled.
    Completed,
    /// Cancelled by the caller.
    Cancelled,
}

impl AdvancedOrderStatus {
    /// Terminal states accept no further releases.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for AdvancedOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Executing => write!(f, "EXECUTING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// The request an advanced order was created from, with resolved parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedOrderRequest {
    /// Splitting algorithm.
    pub kind: AlgorithmKind,
    /// Parent instruction (total quantity).
    pub instruction: TradeInstruction,
    /// Algorithm parameters after defaults were applied.
    pub params: AdvancedOrderParams,
}

/// One planned slice, as produced by a splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedSlice {
    /// Slice quantity (may be zero for time-sliced schedules).
    pub quantity: u64,
    /// Release time for time-sliced algorithms.
    pub scheduled_time: Option<DateTime<Utc>>,
    /// Price offset for randomized variants.
    pub price_offset: Option<Decimal>,
}

impl PlannedSlice {
    /// Slice released as soon as it is revealed.
    #[must_use]
    pub const fn immediate(quantity: u64) -> Self {
        Self {
            quantity,
            scheduled_time: None,
            price_offset: None,
        }
    }

    /// Slice released at `time`.
    #[must_use]
    pub const fn at(time: DateTime<Utc>, quantity: u64) -> Self {
        Self {
            quantity,
            scheduled_time: Some(time),
            price_offset: None,
        }
    }
}

/// Entry of a time-sliced schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceEntry {
    /// Release time.
    pub time: DateTime<Utc>,
    /// Quantity released at that time.
    pub quantity: u64,
}

/// One slice of an advanced order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildOrder {
    id: ChildOrderId,
    parent_id: AdvancedOrderId,
    instruction: TradeInstruction,
    scheduled_time: Option<DateTime<Utc>>,
    price_offset: Option<Decimal>,
    submitted: bool,
    filled: bool,
}

impl ChildOrder {
    /// Child id.
    #[must_use]
    pub const fn id(&self) -> &ChildOrderId {
        &self.id
    }

    /// Parent advanced order id.
    #[must_use]
    pub const fn parent_id(&self) -> &AdvancedOrderId {
        &self.parent_id
    }

    /// Child instruction (parent instruction with the slice quantity).
    #[must_use]
    pub const fn instruction(&self) -> &TradeInstruction {
        &self.instruction
    }

    /// Slice quantity.
    #[must_use]
    pub const fn quantity(&self) -> u64 {
        self.instruction.quantity
    }

    /// Release time, for time-sliced algorithms.
    #[must_use]
    pub const fn scheduled_time(&self) -> Option<DateTime<Utc>> {
        self.scheduled_time
    }

    /// Price offset to add to the execution price.
    #[must_use]
    pub const fn price_offset(&self) -> Option<Decimal> {
        self.price_offset
    }

    /// Whether the child has been handed out for submission.
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Whether the child has been reported filled.
    #[must_use]
    pub const fn is_filled(&self) -> bool {
        self.filled
    }

    /// Submitted and waiting for a fill.
    #[must_use]
    pub const fn is_working(&self) -> bool {
        self.submitted && !self.filled
    }
}

/// Result of reporting a child fill to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// The child was already filled; nothing changed.
    Duplicate,
    /// Fill recorded; `event` is set when it completed the order.
    Applied {
        /// Completion event, if this fill completed the order.
        event: Option<ExecutionEvent>,
    },
}

/// Advanced Order aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedOrder {
    id: AdvancedOrderId,
    request: AdvancedOrderRequest,
    status: AdvancedOrderStatus,
    filled_qty: u64,
    children: Vec<ChildOrder>,
    slice_schedule: Vec<SliceEntry>,
    next_reveal: usize,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AdvancedOrder {
    /// Build an order from its planned slices.
    ///
    /// Scheduled slices are recorded in the slice schedule; zero-quantity
    /// slices produce no child.
    #[must_use]
    pub fn new(
        id: AdvancedOrderId,
        request: AdvancedOrderRequest,
        slices: &[PlannedSlice],
        now: DateTime<Utc>,
    ) -> Self {
        let slice_schedule = slices
            .iter()
            .filter_map(|slice| {
                slice.scheduled_time.map(|time| SliceEntry {
                    time,
                    quantity: slice.quantity,
                })
            })
            .collect();

        let children = slices
            .iter()
            .filter(|slice| slice.quantity > 0)
            .enumerate()
            .map(|(index, slice)| ChildOrder {
                id: ChildOrderId::for_slice(&id, index),
                parent_id: id.clone(),
                instruction: request.instruction.with_quantity(slice.quantity),
                scheduled_time: slice.scheduled_time,
                price_offset: slice.price_offset,
                submitted: false,
                filled: false,
            })
            .collect();

        Self {
            id,
            request,
            status: AdvancedOrderStatus::Pending,
            filled_qty: 0,
            children,
            slice_schedule,
            next_reveal: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Order id.
    #[must_use]
    pub const fn id(&self) -> &AdvancedOrderId {
        &self.id
    }

    /// Splitting algorithm.
    #[must_use]
    pub const fn kind(&self) -> AlgorithmKind {
        self.request.kind
    }

    /// Originating request.
    #[must_use]
    pub const fn request(&self) -> &AdvancedOrderRequest {
        &self.request
    }

    /// Parent instruction.
    #[must_use]
    pub const fn instruction(&self) -> &TradeInstruction {
        &self.request.instruction
    }

    /// Total quantity to trade.
    #[must_use]
    pub const fn total_qty(&self) -> u64 {
        self.request.instruction.quantity
    }

    /// Lifecycle status.
    #[must_use]
    pub const fn status(&self) -> AdvancedOrderStatus {
        self.status
    }

    /// Quantity filled so far.
    #[must_use]
    pub const fn filled_qty(&self) -> u64 {
        self.filled_qty
    }

    /// Quantity not yet filled.
    #[must_use]
    pub const fn remaining_qty(&self) -> u64 {
        self.total_qty().saturating_sub(self.filled_qty)
    }

    /// Child orders in slice order.
    #[must_use]
    pub fn children(&self) -> &[ChildOrder] {
        &self.children
    }

    /// Look up a child by id.
    #[must_use]
    pub fn child(&self, child_id: &ChildOrderId) -> Option<&ChildOrder> {
        self.children.iter().find(|c| &c.id == child_id)
    }

    /// Time-sliced schedule (empty for reveal algorithms).
    #[must_use]
    pub fn slice_schedule(&self) -> &[SliceEntry] {
        &self.slice_schedule
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation time.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the order is completed or cancelled.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Return a released child to the unsubmitted pool so the next release
    /// hands it out again.
    ///
    /// Returns `false` for terminal orders, unknown children, and children
    /// that were never released or have already filled.
    pub fn requeue(&mut self, child_id: &ChildOrderId, now: DateTime<Utc>) -> bool {
        if self.is_terminal() {
            return false;
        }
        let Some(index) = self.children.iter().position(|c| &c.id == child_id) else {
            return false;
        };
        let child = &mut self.children[index];
        if !child.submitted || child.filled {
            return false;
        }
        child.submitted = false;
        if self.kind().is_reveal() {
            self.next_reveal = self.next_reveal.min(index);
        }
        self.updated_at = now;
        true
    }

    /// Release the children that are due at `now`, marking them submitted.
    ///
    /// Time-sliced kinds release every unsubmitted child whose scheduled time
    /// has passed. Reveal kinds release only the next child, and only once
    /// every earlier child has filled.
    pub fn release_due(&mut self, now: DateTime<Utc>) -> Vec<ChildOrder> {
        if self.is_terminal() {
            return Vec::new();
        }

        let mut released = Vec::new();
        if self.kind().is_reveal() {
            while self
                .children
                .get(self.next_reveal)
                .is_some_and(|c| c.submitted)
            {
                self.next_reveal += 1;
            }
            let earlier_filled = self.children[..self.next_reveal]
                .iter()
                .all(|c| c.filled);
            if earlier_filled {
                if let Some(child) = self.children.get_mut(self.next_reveal) {
                    child.submitted = true;
                    released.push(child.clone());
                    self.next_reveal += 1;
                }
            }
        } else {
            for child in &mut self.children {
                let due = child.scheduled_time.is_none_or(|t| now >= t);
                if due && !child.submitted {
                    child.submitted = true;
                    released.push(child.clone());
                }
            }
        }

        if !released.is_empty() {
            if self.status == AdvancedOrderStatus::Pending {
                self.status = AdvancedOrderStatus::Executing;
            }
            self.updated_at = now;
        }
        released
    }

    /// Record a fill for `child_id`.
    ///
    /// Returns `None` when the child does not belong to this order. Fills that
    /// arrive after cancellation are still accounted, without an event.
    pub fn apply_fill(&mut self, child_id: &ChildOrderId, now: DateTime<Utc>) -> Option<FillOutcome> {
        let child = self.children.iter_mut().find(|c| &c.id == child_id)?;
        if child.filled {
            return Some(FillOutcome::Duplicate);
        }

        child.filled = true;
        child.submitted = true;
        self.filled_qty += child.instruction.quantity;
        self.updated_at = now;

        if self.status.is_terminal() || self.filled_qty < self.total_qty() {
            return Some(FillOutcome::Applied { event: None });
        }

        self.status = AdvancedOrderStatus::Completed;
        let event = ExecutionEvent::completed(
            self.kind(),
            AdvancedOrderCompleted {
                order_id: self.id.clone(),
                symbol: self.instruction().contract.clone(),
                total_qty: self.total_qty(),
                filled_qty: self.filled_qty,
                occurred_at: now,
            },
        );
        Some(FillOutcome::Applied { event: Some(event) })
    }

    /// Cancel the order.
    ///
    /// Returns the submitted-but-unfilled children to cancel at the venue and
    /// the cancellation event, or `None` if the order is already terminal.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Option<(Vec<ChildOrderId>, ExecutionEvent)> {
        if self.is_terminal() {
            return None;
        }

        self.status = AdvancedOrderStatus::Cancelled;
        self.updated_at = now;

        let working = self
            .children
            .iter()
            .filter(|c| c.is_working())
            .map(|c| c.id.clone())
            .collect();
        let event = ExecutionEvent::cancelled(
            self.kind(),
            AdvancedOrderCancelled {
                order_id: self.id.clone(),
                symbol: self.instruction().contract.clone(),
                filled_qty: self.filled_qty,
                remaining_qty: self.remaining_qty(),
                occurred_at: now,
            },
        );
        Some((working, event))
    }
}
