//! Adaptive Execution Errors

use thiserror::Error;

/// Errors raised by the adaptive executor.
///
/// Timeouts and retry exhaustion are reported as events, not errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Executor configuration is out of range.
    #[error("Invalid executor config '{field}': {message}")]
    InvalidConfig {
        /// Config field name.
        field: String,
        /// Error details.
        message: String,
    },
}

impl ExecutionError {
    pub(crate) fn invalid_config(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
