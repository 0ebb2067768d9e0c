//! Auto-Save Service
//!
//! Periodically persists engine snapshots off the tick path. At most one
//! write is in flight; a save requested while one is running is dropped,
//! not queued.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;

use crate::application::ports::{PersistenceError, StateRepositoryPort};
use crate::application::state::EngineSnapshot;
use crate::observability;

/// What a save request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The save interval has not elapsed.
    NotDue,
    /// A background write was started.
    Scheduled,
    /// State is identical to the last written snapshot.
    SkippedUnchanged,
    /// A previous write is still running; this request was dropped.
    DroppedInFlight,
    /// The snapshot could not be encoded.
    Failed,
}

impl SaveOutcome {
    /// Label used for logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotDue => "not_due",
            Self::Scheduled => "scheduled",
            Self::SkippedUnchanged => "skipped_unchanged",
            Self::DroppedInFlight => "dropped_in_flight",
            Self::Failed => "failed",
        }
    }
}

/// Background writer for engine snapshots.
pub struct AutoSaveService<R: StateRepositoryPort + 'static> {
    repository: Arc<R>,
    interval: Duration,
    last_save: Option<DateTime<Utc>>,
    last_payload: Arc<Mutex<Option<String>>>,
    in_flight: Option<JoinHandle<()>>,
}

impl<R: StateRepositoryPort + 'static> AutoSaveService<R> {
    /// Create a writer that saves at most once per `interval`.
    pub fn new(repository: Arc<R>, interval: Duration) -> Self {
        Self {
            repository,
            interval,
            last_save: None,
            last_payload: Arc::new(Mutex::new(None)),
            in_flight: None,
        }
    }

    /// Create a writer from an interval in seconds.
    pub fn with_interval_secs(repository: Arc<R>, interval_secs: u64) -> Self {
        let secs = i64::try_from(interval_secs).unwrap_or(i64::MAX);
        Self::new(
            repository,
            Duration::try_seconds(secs).unwrap_or(Duration::MAX),
        )
    }

    /// The backing repository.
    pub const fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Whether a background write is still running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Restart the interval from `now`.
    pub const fn reset(&mut self, now: DateTime<Utc>) {
        self.last_save = Some(now);
    }

    fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.last_save.is_none_or(|last| {
            let next = last
                .checked_add_signed(self.interval)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            now >= next
        })
    }

    /// Start a background write if the interval has elapsed.
    ///
    /// `snapshot_fn` is only called when a write may actually happen.
    pub fn maybe_save<F>(&mut self, now: DateTime<Utc>, snapshot_fn: F) -> SaveOutcome
    where
        F: FnOnce() -> EngineSnapshot,
    {
        if !self.is_due(now) {
            return SaveOutcome::NotDue;
        }
        if self.is_in_flight() {
            tracing::warn!("State save already in flight, dropping save request");
            observability::record_state_save(SaveOutcome::DroppedInFlight.as_str());
            return SaveOutcome::DroppedInFlight;
        }
        self.in_flight = None;

        let snapshot = snapshot_fn();
        let fingerprint = match snapshot.content_fingerprint() {
            Ok(f) => f,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode engine snapshot");
                observability::record_state_save(SaveOutcome::Failed.as_str());
                self.last_save = Some(now);
                return SaveOutcome::Failed;
            }
        };
        self.last_save = Some(now);

        if self.last_written().as_deref() == Some(fingerprint.as_str()) {
            tracing::trace!("Engine state unchanged, skipping save");
            observability::record_state_save(SaveOutcome::SkippedUnchanged.as_str());
            return SaveOutcome::SkippedUnchanged;
        }

        let repository = Arc::clone(&self.repository);
        let last_payload = Arc::clone(&self.last_payload);
        self.in_flight = Some(tokio::spawn(async move {
            match repository.save(&snapshot).await {
                Ok(()) => {
                    *last_payload.lock().unwrap_or_else(PoisonError::into_inner) =
                        Some(fingerprint);
                    observability::record_state_save("saved");
                    tracing::debug!(
                        orders = snapshot.scheduler.orders.len(),
                        managed = snapshot.executor.orders.len(),
                        "Engine state saved"
                    );
                }
                Err(e) => {
                    observability::record_state_save("failed");
                    tracing::error!(error = %e, "Failed to save engine state");
                }
            }
        }));
        SaveOutcome::Scheduled
    }

    /// Wait for any in-flight write, then write a snapshot before returning.
    pub async fn force_save<F>(
        &mut self,
        now: DateTime<Utc>,
        snapshot_fn: F,
    ) -> Result<(), PersistenceError>
    where
        F: FnOnce() -> EngineSnapshot,
    {
        self.wait_for_in_flight().await;

        let snapshot = snapshot_fn();
        self.repository.save(&snapshot).await.inspect_err(|e| {
            observability::record_state_save("failed");
            tracing::error!(error = %e, "Final state save failed");
        })?;

        if let Ok(fingerprint) = snapshot.content_fingerprint() {
            *self
                .last_payload
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(fingerprint);
        }
        self.last_save = Some(now);
        observability::record_state_save("saved");
        tracing::info!(
            orders = snapshot.scheduler.orders.len(),
            "Engine state flushed"
        );
        Ok(())
    }

    /// Block until the running write, if any, completes.
    pub async fn wait_for_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "State save task failed");
            }
        }
    }

    fn last_written(&self) -> Option<String> {
        self.last_payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<R: StateRepositoryPort + 'static> std::fmt::Debug for AutoSaveService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSaveService")
            .field("interval", &self.interval)
            .field("last_save", &self.last_save)
            .field("in_flight", &self.is_in_flight())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::adaptive_execution::{AdaptiveExecutor, OrderExecutionConfig};
    use crate::domain::order_scheduling::{AdvancedOrderScheduler, AdvancedSchedulerConfig};
    use crate::infrastructure::persistence::InMemoryStateRepository;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
    }

    fn snapshot(at: DateTime<Utc>, max_retries: u32) -> EngineSnapshot {
        EngineSnapshot::new(
            at,
            AdvancedOrderScheduler::new(AdvancedSchedulerConfig::default()).snapshot(),
            AdaptiveExecutor::new(OrderExecutionConfig {
                max_retries,
                ..OrderExecutionConfig::default()
            })
            .snapshot(),
        )
    }

    #[tokio::test]
    async fn first_request_is_scheduled_then_interval_applies() {
        let repo = Arc::new(InMemoryStateRepository::new());
        let mut service = AutoSaveService::with_interval_secs(Arc::clone(&repo), 60);

        assert_eq!(service.maybe_save(t0(), || snapshot(t0(), 3)), SaveOutcome::Scheduled);
        service.wait_for_in_flight().await;
        assert_eq!(repo.save_count().await, 1);

        let soon = t0() + Duration::seconds(10);
        assert_eq!(service.maybe_save(soon, || snapshot(soon, 4)), SaveOutcome::NotDue);
    }

    #[tokio::test]
    async fn unchanged_state_is_skipped() {
        let repo = Arc::new(InMemoryStateRepository::new());
        let mut service = AutoSaveService::with_interval_secs(Arc::clone(&repo), 1);

        service.maybe_save(t0(), || snapshot(t0(), 3));
        service.wait_for_in_flight().await;

        let later = t0() + Duration::seconds(5);
        assert_eq!(
            service.maybe_save(later, || snapshot(later, 3)),
            SaveOutcome::SkippedUnchanged
        );
        assert_eq!(repo.save_count().await, 1);
    }

    #[tokio::test]
    async fn request_during_in_flight_write_is_dropped() {
        let repo = Arc::new(
            InMemoryStateRepository::new().with_write_delay(std::time::Duration::from_millis(200)),
        );
        let mut service = AutoSaveService::with_interval_secs(Arc::clone(&repo), 1);

        assert_eq!(service.maybe_save(t0(), || snapshot(t0(), 3)), SaveOutcome::Scheduled);
        let later = t0() + Duration::seconds(5);
        assert_eq!(
            service.maybe_save(later, || snapshot(later, 4)),
            SaveOutcome::DroppedInFlight
        );

        service.wait_for_in_flight().await;
        assert_eq!(repo.save_count().await, 1);
        let stored = repo.load().await.unwrap().unwrap();
        assert_eq!(stored.executor.config.max_retries, 3);
    }

    #[tokio::test]
    async fn force_save_waits_and_writes() {
        let repo = Arc::new(
            InMemoryStateRepository::new().with_write_delay(std::time::Duration::from_millis(50)),
        );
        let mut service = AutoSaveService::with_interval_secs(Arc::clone(&repo), 60);

        service.maybe_save(t0(), || snapshot(t0(), 3));
        service.force_save(t0(), || snapshot(t0(), 5)).await.unwrap();

        assert!(!service.is_in_flight());
        assert_eq!(repo.save_count().await, 2);
        assert_eq!(repo.load().await.unwrap().unwrap().executor.config.max_retries, 5);
    }

    #[tokio::test]
    async fn reset_restarts_interval() {
        let repo = Arc::new(InMemoryStateRepository::new());
        let mut service = AutoSaveService::with_interval_secs(repo, 60);

        service.reset(t0());
        let at = t0() + Duration::seconds(59);
        assert_eq!(service.maybe_save(at, || snapshot(at, 3)), SaveOutcome::NotDue);
        let at = t0() + Duration::seconds(60);
        assert_eq!(service.maybe_save(at, || snapshot(at, 3)), SaveOutcome::Scheduled);
        service.wait_for_in_flight().await;
    }
}
