//! Order Scheduling Value Objects
//!
//! Algorithm choice, request parameters, and the advanced order aggregate.

mod advanced_order;
mod algorithm_kind;
mod order_params;
mod scheduler_config;

pub use advanced_order::{
    AdvancedOrder, AdvancedOrderRequest, AdvancedOrderStatus, ChildOrder, FillOutcome,
    PlannedSlice, SliceEntry,
};
pub use algorithm_kind::AlgorithmKind;
pub use order_params::{AdvancedOrderParams, SplitPlan};
pub use scheduler_config::AdvancedSchedulerConfig;
