//! Infrastructure Layer
//!
//! Adapters implementing the ports defined in the application layer:
//!
//! - `persistence/`: State repositories (in-memory, JSON file)
//! - `venue/`: Venue gateways (paper venue)
//! - `events/`: Event publishers (structured log)

pub mod events;
pub mod persistence;
pub mod venue;
