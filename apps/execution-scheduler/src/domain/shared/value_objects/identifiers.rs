//! Strongly-typed identifiers for domain entities.
//!
//! These keep parent ids, child ids and venue ids from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(AdvancedOrderId, "Unique identifier for an advanced (parent) order.");
define_id!(ChildOrderId, "Identifier of one child slice of an advanced order.");
define_id!(VenueOrderId, "Venue-assigned identifier of an order resting at the exchange.");
define_id!(
    ContractId,
    "Identifier for a tradeable contract (e.g. `rb2501.SHFE`, `IO2506-C-4000.CFFEX`)."
);

impl ChildOrderId {
    /// Child id for the `index`-th slice of `parent`.
    ///
    /// Child ids embed the parent id so that they stay unique across orders
    /// and sort in slice order within one order.
    #[must_use]
    pub fn for_slice(parent: &AdvancedOrderId, index: usize) -> Self {
        Self(format!("{parent}-{index:04}"))
    }
}
