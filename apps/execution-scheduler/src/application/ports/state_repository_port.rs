//! State Repository Port (Driven Port)
//!
//! Durable storage for engine snapshots.

use async_trait::async_trait;

use crate::application::state::EngineSnapshot;

/// Persistence error.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Storage I/O failed.
    #[error("State storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded.
    #[error("State serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No snapshot at the requested location.
    #[error("State not found: {location}")]
    NotFound {
        /// Where the snapshot was expected.
        location: String,
    },
}

/// Port for storing and loading engine snapshots.
#[async_trait]
pub trait StateRepositoryPort: Send + Sync {
    /// Persist a snapshot, replacing any previous one.
    async fn save(&self, snapshot: &EngineSnapshot) -> Result<(), PersistenceError>;

    /// Load the latest snapshot, if one exists.
    async fn load(&self) -> Result<Option<EngineSnapshot>, PersistenceError>;

    /// Load the latest snapshot, failing if none exists.
    async fn load_required(&self) -> Result<EngineSnapshot, PersistenceError> {
        self.load().await?.ok_or_else(|| PersistenceError::NotFound {
            location: std::any::type_name::<Self>().to_string(),
        })
    }
}
