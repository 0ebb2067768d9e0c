//! Order Scheduling Errors

use thiserror::Error;

use super::value_objects::AlgorithmKind;

/// Errors raised when an advanced order request is rejected at submission.
///
/// No scheduler state is created for a rejected request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A parameter is out of range.
    #[error("Invalid parameter '{field}': {message}")]
    InvalidParameter {
        /// Parameter name.
        field: String,
        /// Error details.
        message: String,
    },

    /// A parameter the algorithm needs was not supplied and has no default.
    #[error("Missing parameter '{field}' for {kind}")]
    MissingParameter {
        /// Parameter name.
        field: String,
        /// Algorithm that needs it.
        kind: AlgorithmKind,
    },

    /// The instruction quantity is not positive.
    #[error("Invalid instruction quantity: {quantity}")]
    InvalidQuantity {
        /// The invalid quantity value.
        quantity: u64,
    },
}

impl ScheduleError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn missing(field: &str, kind: AlgorithmKind) -> Self {
        Self::MissingParameter {
            field: field.to_string(),
            kind,
        }
    }
}
