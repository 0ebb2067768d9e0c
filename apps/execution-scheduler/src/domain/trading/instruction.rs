//! Trade Instruction Value Object
//!
//! The unit of intent handed down by sizing/risk logic and handed on to the
//! venue gateway. Immutable: repricing or resizing produces a new instruction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::direction::{Direction, Offset, OrderType};
use crate::domain::shared::ContractId;

/// A trade instruction for one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInstruction {
    /// Contract to trade.
    pub contract: ContractId,
    /// Buy or sell.
    pub direction: Direction,
    /// Open or close.
    pub offset: Offset,
    /// Number of contracts.
    pub quantity: u64,
    /// Reference (or limit) price.
    pub price: Decimal,
    /// Originating strategy signal label.
    #[serde(default)]
    pub signal: String,
    /// Venue order type.
    #[serde(default)]
    pub order_type: OrderType,
}

impl TradeInstruction {
    /// Create a limit instruction with an empty signal label.
    #[must_use]
    pub fn limit(
        contract: ContractId,
        direction: Direction,
        offset: Offset,
        quantity: u64,
        price: Decimal,
    ) -> Self {
        Self {
            contract,
            direction,
            offset,
            quantity,
            price,
            signal: String::new(),
            order_type: OrderType::Limit,
        }
    }

    /// Attach a signal label.
    #[must_use]
    pub fn with_signal(mut self, signal: impl Into<String>) -> Self {
        self.signal = signal.into();
        self
    }

    /// Same instruction with a different quantity.
    #[must_use]
    pub fn with_quantity(&self, quantity: u64) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    /// Same instruction with a different price.
    #[must_use]
    pub fn with_price(&self, price: Decimal) -> Self {
        Self {
            price,
            ..self.clone()
        }
    }
}
