//! Application Layer
//!
//! Orchestrates the domain against the outside world. It defines:
//!
//! - **Ports**: Interfaces for the venue, state storage, and event sinks
//! - **Services**: The execution coordinator, tick loop, and auto-save writer
//! - **State**: The persisted engine snapshot

pub mod ports;
pub mod services;
pub mod state;

pub use ports::*;
pub use services::*;
pub use state::{EngineSnapshot, SNAPSHOT_VERSION};
