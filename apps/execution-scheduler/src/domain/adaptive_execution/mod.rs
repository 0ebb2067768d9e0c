//! Adaptive Execution Bounded Context
//!
//! Prices venue orders against the live quote, supervises them for timeout,
//! and walks the price one tick more aggressive per retry until the retry
//! budget runs out.

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::ExecutionError;
pub use services::{AdaptiveExecutor, ExecutorSnapshot, round_price_to_tick};
pub use value_objects::{
    ManagedOrder, OrderExecutionConfig, RetryDecision, RetryInstruction, TimeoutSweep,
};
