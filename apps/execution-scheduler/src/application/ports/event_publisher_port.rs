//! Event Publisher Port (Driven Port)
//!
//! Interface for dispatching execution events to logging, alerting or
//! persistence collaborators.

use async_trait::async_trait;

use crate::domain::events::ExecutionEvent;

/// Event publishing error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventPublishError {
    /// Publishing failed.
    #[error("Event publish failed: {message}")]
    PublishFailed {
        /// Error details.
        message: String,
    },
}

/// Port for publishing execution events.
#[async_trait]
pub trait EventPublisherPort: Send + Sync {
    /// Publish a batch of events, in order.
    async fn publish_events(&self, events: &[ExecutionEvent]) -> Result<(), EventPublishError>;
}

/// No-op event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisherPort for NoOpEventPublisher {
    async fn publish_events(&self, _events: &[ExecutionEvent]) -> Result<(), EventPublishError> {
        Ok(())
    }
}
