// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_collect,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Execution Scheduler - Rust Core Library
//!
//! Splits large trade instructions into child orders and supervises them at
//! the venue.
//!
//! # Architecture (DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Pure state machines; every mutating call returns its events
//!   - `order_scheduling`: ICEBERG, TWAP, VWAP, TIMED_SPLIT, CLASSIC_ICEBERG,
//!     ENHANCED_TWAP splitting and release
//!   - `adaptive_execution`: Limit pricing, timeouts, price-walk retries
//!   - `events`: Completion, cancellation, timeout and exhaustion records
//!   - `trading`, `shared`: Instructions, quotes, identifiers
//!
//! - **Application**: Orchestration
//!   - `services`: `ExecutionCoordinator`, `ExecutionLoop`, `AutoSaveService`
//!   - `ports`: `VenueGatewayPort`, `StateRepositoryPort`, `EventPublisherPort`
//!   - `state`: `EngineSnapshot`
//!
//! - **Infrastructure**: Adapters
//!   - `persistence`: In-memory and JSON file state repositories
//!   - `venue`: Paper venue
//!   - `events`: Logging event publisher

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Layers
// =============================================================================

/// Domain layer - Core scheduling and execution logic.
pub mod domain;

/// Application layer - Services and port definitions.
pub mod application;

/// Infrastructure layer - Adapters.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Tracing and metrics.
pub mod observability;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::services::{
    AutoSaveService, ExecutionCoordinator, ExecutionLoop, SaveOutcome, TickReport,
};
pub use application::state::EngineSnapshot;
pub use domain::adaptive_execution::{AdaptiveExecutor, OrderExecutionConfig};
pub use domain::events::ExecutionEvent;
pub use domain::order_scheduling::{
    AdvancedOrder, AdvancedOrderParams, AdvancedOrderScheduler, AdvancedSchedulerConfig,
    AlgorithmKind, ScheduleError,
};
pub use domain::shared::{AdvancedOrderId, ChildOrderId, ContractId, VenueOrderId};
pub use domain::trading::{Direction, Offset, OrderType, Quote, TradeInstruction};
