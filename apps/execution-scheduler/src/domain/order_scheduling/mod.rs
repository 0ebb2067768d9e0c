//! Order Scheduling Bounded Context
//!
//! Turns one trade instruction plus an algorithm choice into a schedule of
//! child orders and tracks their fill progress.
//!
//! # Algorithms
//!
//! - **ICEBERG / CLASSIC_ICEBERG**: capped batches revealed one at a time
//! - **TIMED_SPLIT**: capped batches released at a fixed interval
//! - **TWAP / ENHANCED_TWAP**: equal slices across a time window
//! - **VWAP**: slices weighted by a volume profile

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::ScheduleError;
pub use services::{AdvancedOrderScheduler, CancelOutcome, SchedulerSnapshot};
pub use value_objects::{
    AdvancedOrder, AdvancedOrderParams, AdvancedOrderRequest, AdvancedOrderStatus,
    AdvancedSchedulerConfig, AlgorithmKind, ChildOrder, SliceEntry,
};
