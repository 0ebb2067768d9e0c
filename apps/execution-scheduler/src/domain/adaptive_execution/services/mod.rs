//! Adaptive Execution Domain Services

mod adaptive_executor;

pub use adaptive_executor::{AdaptiveExecutor, ExecutorSnapshot, round_price_to_tick};
