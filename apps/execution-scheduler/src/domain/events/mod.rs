//! Execution Events
//!
//! Immutable records returned by every mutating engine call. The host decides
//! how to dispatch them (log, persist, alert).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_scheduling::value_objects::AlgorithmKind;
use crate::domain::shared::{AdvancedOrderId, ContractId, VenueOrderId};

/// All events produced by the scheduler and the adaptive executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionEvent {
    /// Iceberg order fully filled.
    IcebergComplete(AdvancedOrderCompleted),
    /// TWAP order fully filled.
    TwapComplete(AdvancedOrderCompleted),
    /// VWAP order fully filled.
    VwapComplete(AdvancedOrderCompleted),
    /// Timed-split order fully filled.
    TimedSplitComplete(AdvancedOrderCompleted),
    /// Classic iceberg order fully filled.
    ClassicIcebergComplete(AdvancedOrderCompleted),
    /// Enhanced TWAP order fully filled.
    EnhancedTwapComplete(AdvancedOrderCompleted),
    /// Iceberg order cancelled.
    IcebergCancelled(AdvancedOrderCancelled),
    /// TWAP order cancelled.
    TwapCancelled(AdvancedOrderCancelled),
    /// VWAP order cancelled.
    VwapCancelled(AdvancedOrderCancelled),
    /// Timed-split order cancelled.
    TimedSplitCancelled(AdvancedOrderCancelled),
    /// Classic iceberg order cancelled.
    ClassicIcebergCancelled(AdvancedOrderCancelled),
    /// Enhanced TWAP order cancelled.
    EnhancedTwapCancelled(AdvancedOrderCancelled),
    /// A venue order exceeded its timeout.
    OrderTimeout(OrderTimedOut),
    /// A venue order ran out of price retries.
    RetryExhausted(RetriesExhausted),
}

impl ExecutionEvent {
    /// Completion event for an order of `kind`.
    #[must_use]
    pub fn completed(kind: AlgorithmKind, event: AdvancedOrderCompleted) -> Self {
        match kind {
            AlgorithmKind::Iceberg => Self::IcebergComplete(event),
            AlgorithmKind::Twap => Self::TwapComplete(event),
            AlgorithmKind::Vwap => Self::VwapComplete(event),
            AlgorithmKind::TimedSplit => Self::TimedSplitComplete(event),
            AlgorithmKind::ClassicIceberg => Self::ClassicIcebergComplete(event),
            AlgorithmKind::EnhancedTwap => Self::EnhancedTwapComplete(event),
        }
    }

    /// Cancellation event for an order of `kind`.
    #[must_use]
    pub fn cancelled(kind: AlgorithmKind, event: AdvancedOrderCancelled) -> Self {
        match kind {
            AlgorithmKind::Iceberg => Self::IcebergCancelled(event),
            AlgorithmKind::Twap => Self::TwapCancelled(event),
            AlgorithmKind::Vwap => Self::VwapCancelled(event),
            AlgorithmKind::TimedSplit => Self::TimedSplitCancelled(event),
            AlgorithmKind::ClassicIceberg => Self::ClassicIcebergCancelled(event),
            AlgorithmKind::EnhancedTwap => Self::EnhancedTwapCancelled(event),
        }
    }

    /// Algorithm of the advanced order this event refers to, if any.
    #[must_use]
    pub const fn algorithm_kind(&self) -> Option<AlgorithmKind> {
        match self {
            Self::IcebergComplete(_) | Self::IcebergCancelled(_) => Some(AlgorithmKind::Iceberg),
            Self::TwapComplete(_) | Self::TwapCancelled(_) => Some(AlgorithmKind::Twap),
            Self::VwapComplete(_) | Self::VwapCancelled(_) => Some(AlgorithmKind::Vwap),
            Self::TimedSplitComplete(_) | Self::TimedSplitCancelled(_) => {
                Some(AlgorithmKind::TimedSplit)
            }
            Self::ClassicIcebergComplete(_) | Self::ClassicIcebergCancelled(_) => {
                Some(AlgorithmKind::ClassicIceberg)
            }
            Self::EnhancedTwapComplete(_) | Self::EnhancedTwapCancelled(_) => {
                Some(AlgorithmKind::EnhancedTwap)
            }
            Self::OrderTimeout(_) | Self::RetryExhausted(_) => None,
        }
    }

    /// Get the contract this event refers to.
    #[must_use]
    pub fn symbol(&self) -> &ContractId {
        match self {
            Self::IcebergComplete(e)
            | Self::TwapComplete(e)
            | Self::VwapComplete(e)
            | Self::TimedSplitComplete(e)
            | Self::ClassicIcebergComplete(e)
            | Self::EnhancedTwapComplete(e) => &e.symbol,
            Self::IcebergCancelled(e)
            | Self::TwapCancelled(e)
            | Self::VwapCancelled(e)
            | Self::TimedSplitCancelled(e)
            | Self::ClassicIcebergCancelled(e)
            | Self::EnhancedTwapCancelled(e) => &e.symbol,
            Self::OrderTimeout(e) => &e.symbol,
            Self::RetryExhausted(e) => &e.symbol,
        }
    }

    /// Get the timestamp when this event occurred.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::IcebergComplete(e)
            | Self::TwapComplete(e)
            | Self::VwapComplete(e)
            | Self::TimedSplitComplete(e)
            | Self::ClassicIcebergComplete(e)
            | Self::EnhancedTwapComplete(e) => e.occurred_at,
            Self::IcebergCancelled(e)
            | Self::TwapCancelled(e)
            | Self::VwapCancelled(e)
            | Self::TimedSplitCancelled(e)
            | Self::ClassicIcebergCancelled(e)
            | Self::EnhancedTwapCancelled(e) => e.occurred_at,
            Self::OrderTimeout(e) => e.occurred_at,
            Self::RetryExhausted(e) => e.occurred_at,
        }
    }

    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::IcebergComplete(_) => "ICEBERG_COMPLETE",
            Self::TwapComplete(_) => "TWAP_COMPLETE",
            Self::VwapComplete(_) => "VWAP_COMPLETE",
            Self::TimedSplitComplete(_) => "TIMED_SPLIT_COMPLETE",
            Self::ClassicIcebergComplete(_) => "CLASSIC_ICEBERG_COMPLETE",
            Self::EnhancedTwapComplete(_) => "ENHANCED_TWAP_COMPLETE",
            Self::IcebergCancelled(_) => "ICEBERG_CANCELLED",
            Self::TwapCancelled(_) => "TWAP_CANCELLED",
            Self::VwapCancelled(_) => "VWAP_CANCELLED",
            Self::TimedSplitCancelled(_) => "TIMED_SPLIT_CANCELLED",
            Self::ClassicIcebergCancelled(_) => "CLASSIC_ICEBERG_CANCELLED",
            Self::EnhancedTwapCancelled(_) => "ENHANCED_TWAP_CANCELLED",
            Self::OrderTimeout(_) => "ORDER_TIMEOUT",
            Self::RetryExhausted(_) => "RETRY_EXHAUSTED",
        }
    }

    /// Whether this is a completion event of any kind.
    #[must_use]
    pub const fn is_completion(&self) -> bool {
        matches!(
            self,
            Self::IcebergComplete(_)
                | Self::TwapComplete(_)
                | Self::VwapComplete(_)
                | Self::TimedSplitComplete(_)
                | Self::ClassicIcebergComplete(_)
                | Self::EnhancedTwapComplete(_)
        )
    }

    /// Whether this is a cancellation event of any kind.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::IcebergCancelled(_)
                | Self::TwapCancelled(_)
                | Self::VwapCancelled(_)
                | Self::TimedSplitCancelled(_)
                | Self::ClassicIcebergCancelled(_)
                | Self::EnhancedTwapCancelled(_)
        )
    }
}

/// Event: advanced order fully filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedOrderCompleted {
    /// Advanced order ID.
    pub order_id: AdvancedOrderId,
    /// Contract traded.
    pub symbol: ContractId,
    /// Original total quantity.
    pub total_qty: u64,
    /// Quantity filled (equals `total_qty`).
    pub filled_qty: u64,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Event: advanced order cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedOrderCancelled {
    /// Advanced order ID.
    pub order_id: AdvancedOrderId,
    /// Contract traded.
    pub symbol: ContractId,
    /// Quantity filled before cancellation.
    pub filled_qty: u64,
    /// Quantity left unfilled.
    pub remaining_qty: u64,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Event: venue order exceeded its timeout and was flagged for cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTimedOut {
    /// Venue order ID.
    pub venue_id: VenueOrderId,
    /// Contract traded.
    pub symbol: ContractId,
    /// Time since submission, in milliseconds.
    pub elapsed_ms: i64,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Event: a venue order timed out with no retries left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetriesExhausted {
    /// Venue order ID of the last attempt.
    pub venue_id: VenueOrderId,
    /// Contract traded.
    pub symbol: ContractId,
    /// Retries performed.
    pub total_retries: u32,
    /// Price of the first attempt.
    pub original_price: Decimal,
    /// Price of the last attempt.
    pub final_price: Decimal,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}
