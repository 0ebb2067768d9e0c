//! Managed Order
//!
//! A venue order under timeout and retry supervision. Parent-agnostic: the
//! optional correlation tag is the only link back to whatever produced it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::events::ExecutionEvent;
use crate::domain::shared::VenueOrderId;
use crate::domain::trading::TradeInstruction;

/// A venue order under supervision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedOrder {
    venue_id: VenueOrderId,
    instruction: TradeInstruction,
    submit_time: DateTime<Utc>,
    retry_count: u32,
    active: bool,
    original_price: Decimal,
    correlation_id: Option<String>,
}

impl ManagedOrder {
    /// A first attempt, submitted at `submit_time`.
    #[must_use]
    pub fn new(
        venue_id: VenueOrderId,
        instruction: TradeInstruction,
        submit_time: DateTime<Utc>,
        correlation_id: Option<String>,
    ) -> Self {
        let original_price = instruction.price;
        Self {
            venue_id,
            instruction,
            submit_time,
            retry_count: 0,
            active: true,
            original_price,
            correlation_id,
        }
    }

    /// A resubmission carrying the retry count and original price forward.
    #[must_use]
    pub fn from_retry(venue_id: VenueOrderId, retry: RetryInstruction, submit_time: DateTime<Utc>) -> Self {
        Self {
            venue_id,
            instruction: retry.instruction,
            submit_time,
            retry_count: retry.attempt,
            active: true,
            original_price: retry.original_price,
            correlation_id: retry.correlation_id,
        }
    }

    /// Venue order id.
    #[must_use]
    pub const fn venue_id(&self) -> &VenueOrderId {
        &self.venue_id
    }

    /// Instruction as sent to the venue.
    #[must_use]
    pub const fn instruction(&self) -> &TradeInstruction {
        &self.instruction
    }

    /// When the order reached the venue.
    #[must_use]
    pub const fn submit_time(&self) -> DateTime<Utc> {
        self.submit_time
    }

    /// Retries already performed for this order chain.
    #[must_use]
    pub const fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Still under timeout supervision.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Price of the first attempt in this chain.
    #[must_use]
    pub const fn original_price(&self) -> Decimal {
        self.original_price
    }

    /// Caller-supplied correlation tag.
    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub(crate) const fn deactivate(&mut self) {
        self.active = false;
    }
}

/// A repriced resubmission of a timed-out order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryInstruction {
    /// Instruction to submit, one tick more aggressive.
    pub instruction: TradeInstruction,
    /// Retry number, starting at 1.
    pub attempt: u32,
    /// Price of the first attempt.
    pub original_price: Decimal,
    /// Correlation tag of the timed-out order.
    pub correlation_id: Option<String>,
}

/// Orders flagged by a timeout sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeoutSweep {
    /// Venue orders to cancel.
    pub cancel_ids: Vec<VenueOrderId>,
    /// One timeout event per flagged order.
    pub events: Vec<ExecutionEvent>,
}

/// Outcome of preparing a retry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryDecision {
    /// The resubmission, if retries remain.
    pub retry: Option<RetryInstruction>,
    /// A single exhaustion event when no retries remain.
    pub events: Vec<ExecutionEvent>,
}
