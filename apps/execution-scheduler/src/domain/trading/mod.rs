//! Trading Value Objects
//!
//! The trade instruction consumed from upstream sizing/risk logic and
//! produced for the venue gateway, plus the quote it is priced against.

mod direction;
mod instruction;
mod quote;

pub use direction::{Direction, Offset, OrderType};
pub use instruction::TradeInstruction;
pub use quote::Quote;
