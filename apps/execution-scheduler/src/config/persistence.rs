//! State persistence configuration.

use serde::{Deserialize, Serialize};

/// State persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Enable state persistence.
    #[serde(default = "default_persistence_enabled")]
    pub enabled: bool,
    /// Snapshot file path.
    #[serde(default = "default_state_path")]
    pub path: String,
    /// How often to persist state (seconds).
    #[serde(default = "default_auto_save_interval")]
    pub auto_save_interval_secs: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_persistence_enabled(),
            path: default_state_path(),
            auto_save_interval_secs: default_auto_save_interval(),
        }
    }
}

const fn default_persistence_enabled() -> bool {
    true
}

fn default_state_path() -> String {
    "./data/execution_state.json".to_string()
}

const fn default_auto_save_interval() -> u64 {
    60
}
