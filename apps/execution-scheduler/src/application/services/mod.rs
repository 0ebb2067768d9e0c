//! Application Services
//!
//! Services that drive the domain: the execution coordinator, the host tick
//! loop, and the background state writer.

mod auto_save;
mod execution_coordinator;
mod execution_loop;

pub use auto_save::{AutoSaveService, SaveOutcome};
pub use execution_coordinator::{
    ExecutionCoordinator, OrderCancellation, ReadyChild, TimeoutOutcome,
};
pub use execution_loop::{ExecutionLoop, TickReport};
