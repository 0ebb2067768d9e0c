//! Event publisher that writes execution events to the log.

use async_trait::async_trait;

use crate::application::ports::{EventPublishError, EventPublisherPort};
use crate::domain::events::ExecutionEvent;

/// Publishes events as structured log records.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventPublisher;

impl LoggingEventPublisher {
    /// Create a publisher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisherPort for LoggingEventPublisher {
    async fn publish_events(&self, events: &[ExecutionEvent]) -> Result<(), EventPublishError> {
        for event in events {
            let payload = serde_json::to_string(event).map_err(|e| {
                EventPublishError::PublishFailed {
                    message: e.to_string(),
                }
            })?;
            tracing::info!(
                event_type = event.event_type(),
                contract = %event.symbol(),
                payload = %payload,
                "Execution event"
            );
        }
        Ok(())
    }
}
