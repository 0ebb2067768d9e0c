//! Execution Loop
//!
//! Host driver for one engine tick: asks the coordinator what to do and
//! performs it against the venue, then publishes events and saves state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::auto_save::{AutoSaveService, SaveOutcome};
use super::execution_coordinator::ExecutionCoordinator;
use crate::application::ports::{
    EventPublisherPort, PersistenceError, StateRepositoryPort, VenueGatewayPort,
};
use crate::domain::events::ExecutionEvent;
use crate::domain::order_scheduling::{AdvancedOrder, AdvancedOrderParams, AlgorithmKind, ScheduleError};
use crate::domain::shared::{AdvancedOrderId, ContractId};
use crate::domain::trading::{Quote, TradeInstruction};

/// Summary of one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Children released by the scheduler.
    pub released: usize,
    /// Orders accepted by the venue, retries included.
    pub submitted: usize,
    /// Fills applied.
    pub fills: usize,
    /// Orders flagged by the timeout sweep.
    pub timeouts: usize,
    /// Retries accepted by the venue.
    pub retries: usize,
    /// Every event produced during the tick.
    pub events: Vec<ExecutionEvent>,
    /// Auto-save result, when auto-save is enabled.
    pub save: Option<SaveOutcome>,
}

/// Drives the coordinator against a venue.
pub struct ExecutionLoop<V, R, P>
where
    V: VenueGatewayPort,
    R: StateRepositoryPort + 'static,
    P: EventPublisherPort,
{
    coordinator: ExecutionCoordinator,
    venue: Arc<V>,
    publisher: Arc<P>,
    auto_save: Option<AutoSaveService<R>>,
}

impl<V, R, P> ExecutionLoop<V, R, P>
where
    V: VenueGatewayPort,
    R: StateRepositoryPort + 'static,
    P: EventPublisherPort,
{
    /// Create a loop without persistence.
    pub const fn new(coordinator: ExecutionCoordinator, venue: Arc<V>, publisher: Arc<P>) -> Self {
        Self {
            coordinator,
            venue,
            publisher,
            auto_save: None,
        }
    }

    /// Enable periodic state saves.
    #[must_use]
    pub fn with_auto_save(mut self, auto_save: AutoSaveService<R>) -> Self {
        self.auto_save = Some(auto_save);
        self
    }

    /// The coordinator.
    pub const fn coordinator(&self) -> &ExecutionCoordinator {
        &self.coordinator
    }

    /// The venue gateway.
    pub const fn venue(&self) -> &Arc<V> {
        &self.venue
    }

    /// Submit an advanced order.
    pub fn submit(
        &mut self,
        kind: AlgorithmKind,
        instruction: TradeInstruction,
        params: &AdvancedOrderParams,
        now: DateTime<Utc>,
    ) -> Result<AdvancedOrder, ScheduleError> {
        self.coordinator.submit(kind, instruction, params, now)
    }

    /// Run one tick at `now`, pricing against `quote_for`.
    pub async fn tick<F>(&mut self, now: DateTime<Utc>, quote_for: F) -> TickReport
    where
        F: Fn(&ContractId) -> Quote,
    {
        let mut report = TickReport::default();

        let ready = self.coordinator.process_due_with(now, &quote_for);
        report.released = ready.len();
        for child in ready {
            match self.venue.submit(&child.instruction).await {
                Ok(venue_id) => {
                    self.coordinator
                        .on_submitted(&child.child_id, venue_id, child.instruction, now);
                    report.submitted += 1;
                }
                Err(e) => {
                    tracing::warn!(child_id = %child.child_id, error = %e, "Child order submission failed");
                    self.coordinator.on_submit_failed(&child.child_id, now);
                }
            }
        }

        match self.venue.drain_fills().await {
            Ok(fills) => {
                for venue_id in fills {
                    report.fills += 1;
                    report
                        .events
                        .extend(self.coordinator.on_venue_filled(&venue_id, now));
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to drain venue fills"),
        }

        let timeouts = self
            .coordinator
            .on_timeout_tick_with(now, |contract| quote_for(contract).tick);
        report.timeouts = timeouts.cancel_ids.len();
        report.events.extend(timeouts.events);

        for venue_id in &timeouts.cancel_ids {
            if let Err(e) = self.venue.cancel(venue_id).await {
                tracing::warn!(venue_id = %venue_id, error = %e, "Cancel of timed-out order failed");
            }
        }
        for retry in timeouts.retries {
            match self.venue.submit(&retry.instruction).await {
                Ok(venue_id) => {
                    self.coordinator.on_retry_submitted(venue_id, retry, now);
                    report.submitted += 1;
                    report.retries += 1;
                }
                Err(e) => {
                    tracing::warn!(attempt = retry.attempt, error = %e, "Retry submission failed");
                    self.coordinator.on_retry_failed(&retry, now);
                }
            }
        }

        self.publish(&report.events).await;

        if let Some(auto_save) = self.auto_save.as_mut() {
            let coordinator = &self.coordinator;
            report.save = Some(auto_save.maybe_save(now, || coordinator.snapshot(now)));
        }
        report
    }

    /// Cancel an advanced order and its working venue orders.
    pub async fn cancel_order(
        &mut self,
        order_id: &AdvancedOrderId,
        now: DateTime<Utc>,
    ) -> Vec<ExecutionEvent> {
        let cancellation = self.coordinator.cancel(order_id, now);
        for venue_id in &cancellation.venue_ids {
            if let Err(e) = self.venue.cancel(venue_id).await {
                tracing::warn!(venue_id = %venue_id, error = %e, "Venue cancel failed");
            }
        }
        self.publish(&cancellation.events).await;
        cancellation.events
    }

    /// Flush state before exit.
    pub async fn shutdown(&mut self, now: DateTime<Utc>) -> Result<(), PersistenceError> {
        let Some(auto_save) = self.auto_save.as_mut() else {
            return Ok(());
        };
        let coordinator = &self.coordinator;
        auto_save.force_save(now, || coordinator.snapshot(now)).await
    }

    async fn publish(&self, events: &[ExecutionEvent]) {
        if events.is_empty() {
            return;
        }
        if let Err(e) = self.publisher.publish_events(events).await {
            tracing::warn!(error = %e, count = events.len(), "Failed to publish events");
        }
    }
}
