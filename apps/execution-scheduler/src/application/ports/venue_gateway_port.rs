//! Venue Gateway Port (Driven Port)
//!
//! Interface for submitting and cancelling orders at the trading venue.
//! Fills are pulled in batches and pushed back into the engine by the host.

use async_trait::async_trait;

use crate::domain::shared::VenueOrderId;
use crate::domain::trading::TradeInstruction;

/// Venue port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VenueError {
    /// Order rejected by the venue.
    #[error("Order rejected: {reason}")]
    Rejected {
        /// Rejection reason.
        reason: String,
    },

    /// Order not known to the venue.
    #[error("Venue order not found: {venue_id}")]
    NotFound {
        /// The missing venue order ID.
        venue_id: VenueOrderId,
    },

    /// Venue unreachable.
    #[error("Venue unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

/// Port for venue interactions.
#[async_trait]
pub trait VenueGatewayPort: Send + Sync {
    /// Submit an instruction. Returns the venue-assigned order id.
    async fn submit(&self, instruction: &TradeInstruction) -> Result<VenueOrderId, VenueError>;

    /// Cancel a resting order.
    async fn cancel(&self, venue_id: &VenueOrderId) -> Result<(), VenueError>;

    /// Take every fill reported since the last call.
    async fn drain_fills(&self) -> Result<Vec<VenueOrderId>, VenueError>;
}
