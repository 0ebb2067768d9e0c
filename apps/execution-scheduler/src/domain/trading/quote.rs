//! Market Quote Value Object

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// Best bid/ask and tick size for one contract.
///
/// Non-positive values mean "unavailable"; pricing falls back to the
/// instruction's own price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Best bid.
    pub bid: Decimal,
    /// Best ask.
    pub ask: Decimal,
    /// Minimum price increment.
    pub tick: Decimal,
}

impl Quote {
    /// Create a quote.
    #[must_use]
    pub const fn new(bid: Decimal, ask: Decimal, tick: Decimal) -> Self {
        Self { bid, ask, tick }
    }

    /// Both sides present.
    #[must_use]
    pub fn is_two_sided(&self) -> bool {
        self.bid > Decimal::ZERO && self.ask > Decimal::ZERO
    }

    /// Whether a limit at `price` on `direction` is marketable against this quote.
    #[must_use]
    pub fn is_crossed_by(&self, direction: Direction, price: Decimal) -> bool {
        match direction {
            Direction::Buy => self.ask > Decimal::ZERO && price >= self.ask,
            Direction::Sell => self.bid > Decimal::ZERO && price <= self.bid,
        }
    }
}
