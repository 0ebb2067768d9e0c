//! Order Scheduling Domain Services

mod iceberg_splitter;
mod scheduler;
mod twap_splitter;
mod vwap_splitter;

pub use iceberg_splitter::IcebergSplitter;
pub use scheduler::{AdvancedOrderScheduler, CancelOutcome, SchedulerSnapshot};
pub use twap_splitter::TwapSplitter;
pub use vwap_splitter::VwapSplitter;
