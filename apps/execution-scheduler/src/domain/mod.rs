//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: Consistency boundaries with invariants
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Events**: Records of state transitions, returned from every mutating call
//! - **Domain Services**: Synchronous state machines driven by caller-supplied time
//!
//! # Bounded Contexts
//!
//! - [`order_scheduling`]: Parent/child order model and splitting algorithms
//! - [`adaptive_execution`]: Quote-aware pricing, timeout and retry supervision
//! - [`trading`]: Trade instructions and quotes shared by both

pub mod adaptive_execution;
pub mod events;
pub mod order_scheduling;
pub mod shared;
pub mod trading;
