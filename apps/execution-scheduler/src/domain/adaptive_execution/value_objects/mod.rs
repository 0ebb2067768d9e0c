//! Adaptive Execution Value Objects

mod executor_config;
mod managed_order;

pub use executor_config::OrderExecutionConfig;
pub use managed_order::{ManagedOrder, RetryDecision, RetryInstruction, TimeoutSweep};
