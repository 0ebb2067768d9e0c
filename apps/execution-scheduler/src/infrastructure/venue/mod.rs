//! Venue Adapters
//!
//! Implementations of `VenueGatewayPort`.

pub mod paper;

pub use paper::PaperVenue;
