//! Algorithm Kind Value Object

use serde::{Deserialize, Serialize};
use std::fmt;

/// Available order-splitting algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlgorithmKind {
    /// Reveal fixed-size batches one at a time, next batch after the previous fills.
    Iceberg,
    /// Equal slices spread evenly across a time window.
    Twap,
    /// Slices sized by a volume profile across a time window.
    Vwap,
    /// Fixed-size batches released at a fixed interval.
    TimedSplit,
    /// Iceberg with randomized batch sizes and price offsets.
    ClassicIceberg,
    /// TWAP variant tracked under its own kind for reporting.
    EnhancedTwap,
}

impl AlgorithmKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Iceberg,
        Self::Twap,
        Self::Vwap,
        Self::TimedSplit,
        Self::ClassicIceberg,
        Self::EnhancedTwap,
    ];

    /// Children are released by schedule time.
    #[must_use]
    pub const fn is_time_sliced(&self) -> bool {
        matches!(
            self,
            Self::Twap | Self::Vwap | Self::TimedSplit | Self::EnhancedTwap
        )
    }

    /// Children are revealed one at a time, each after the previous fills.
    #[must_use]
    pub const fn is_reveal(&self) -> bool {
        matches!(self, Self::Iceberg | Self::ClassicIceberg)
    }

    /// Event-name prefix, e.g. `Iceberg` for `IcebergCompleteEvent`.
    #[must_use]
    pub const fn event_prefix(&self) -> &'static str {
        match self {
            Self::Iceberg => "Iceberg",
            Self::Twap => "Twap",
            Self::Vwap => "Vwap",
            Self::TimedSplit => "TimedSplit",
            Self::ClassicIceberg => "ClassicIceberg",
            Self::EnhancedTwap => "EnhancedTwap",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iceberg => write!(f, "ICEBERG"),
            Self::Twap => write!(f, "TWAP"),
            Self::Vwap => write!(f, "VWAP"),
            Self::TimedSplit => write!(f, "TIMED_SPLIT"),
            Self::ClassicIceberg => write!(f, "CLASSIC_ICEBERG"),
            Self::EnhancedTwap => write!(f, "ENHANCED_TWAP"),
        }
    }
}
