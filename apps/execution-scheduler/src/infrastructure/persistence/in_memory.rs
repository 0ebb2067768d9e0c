//! In-memory state repository for testing.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{PersistenceError, StateRepositoryPort};
use crate::application::state::EngineSnapshot;

/// In-memory implementation of `StateRepositoryPort`.
///
/// Suitable for testing and development. Not for production use.
#[derive(Debug, Default)]
pub struct InMemoryStateRepository {
    snapshot: RwLock<Option<EngineSnapshot>>,
    save_count: RwLock<usize>,
    write_delay: Option<Duration>,
}

impl InMemoryStateRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: EngineSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
            ..Self::default()
        }
    }

    /// Make every save take at least `delay`.
    #[must_use]
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// Number of completed saves.
    pub async fn save_count(&self) -> usize {
        *self.save_count.read().await
    }

    /// Drop the stored snapshot.
    pub async fn clear(&self) {
        *self.snapshot.write().await = None;
    }
}

#[async_trait]
impl StateRepositoryPort for InMemoryStateRepository {
    async fn save(&self, snapshot: &EngineSnapshot) -> Result<(), PersistenceError> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        *self.snapshot.write().await = Some(snapshot.clone());
        *self.save_count.write().await += 1;
        Ok(())
    }

    async fn load(&self) -> Result<Option<EngineSnapshot>, PersistenceError> {
        Ok(self.snapshot.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::adaptive_execution::{AdaptiveExecutor, OrderExecutionConfig};
    use crate::domain::order_scheduling::{AdvancedOrderScheduler, AdvancedSchedulerConfig};
    use chrono::Utc;

    fn snapshot() -> EngineSnapshot {
        EngineSnapshot::new(
            Utc::now(),
            AdvancedOrderScheduler::new(AdvancedSchedulerConfig::default()).snapshot(),
            AdaptiveExecutor::new(OrderExecutionConfig::default()).snapshot(),
        )
    }

    #[tokio::test]
    async fn save_and_load() {
        let repo = InMemoryStateRepository::new();
        assert!(repo.load().await.unwrap().is_none());

        let snap = snapshot();
        repo.save(&snap).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), Some(snap));
        assert_eq!(repo.save_count().await, 1);
    }

    #[tokio::test]
    async fn load_required_fails_when_empty() {
        let repo = InMemoryStateRepository::new();
        let err = repo.load_required().await.unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound { .. }));

        let repo = InMemoryStateRepository::with_snapshot(snapshot());
        assert!(repo.load_required().await.is_ok());
    }

    #[tokio::test]
    async fn clear_removes_snapshot() {
        let repo = InMemoryStateRepository::with_snapshot(snapshot());
        repo.clear().await;
        assert!(repo.load().await.unwrap().is_none());
    }
}
