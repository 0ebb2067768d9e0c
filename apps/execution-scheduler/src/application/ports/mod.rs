//! Application Ports (Driven)
//!
//! Ports define interfaces for interacting with external systems:
//! durable state storage, the trading venue, and event consumers.

mod event_publisher_port;
mod state_repository_port;
mod venue_gateway_port;

pub use event_publisher_port::{EventPublishError, EventPublisherPort, NoOpEventPublisher};
pub use state_repository_port::{PersistenceError, StateRepositoryPort};
pub use venue_gateway_port::{VenueError, VenueGatewayPort};
