//! Engine State
//!
//! The persisted shape of the whole engine: scheduler orders and executor
//! supervision state, each with its configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::adaptive_execution::ExecutorSnapshot;
use crate::domain::order_scheduling::SchedulerSnapshot;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Snapshot of the scheduler and executor, as written by the auto-save service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Format version.
    pub version: u32,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// Scheduler state.
    pub scheduler: SchedulerSnapshot,
    /// Executor state.
    pub executor: ExecutorSnapshot,
}

impl EngineSnapshot {
    /// Snapshot at the current format version.
    #[must_use]
    pub const fn new(
        saved_at: DateTime<Utc>,
        scheduler: SchedulerSnapshot,
        executor: ExecutorSnapshot,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at,
            scheduler,
            executor,
        }
    }

    /// Serialized content without the timestamp, for change detection.
    pub(crate) fn content_fingerprint(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&(&self.version, &self.scheduler, &self.executor))
    }
}
