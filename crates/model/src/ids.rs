//! Typed identifiers for entities in the data model.
//!
//! Each id newtype wraps a [`uuid::Uuid`] so stage crates cannot accidentally
//! pass a `SourceId` where a `RawListingId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generates a new random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(SourceId, "Identifies a [`crate::Source`] (marketplace).");
uuid_id!(RawListingId, "Identifies a [`crate::RawListing`].");
uuid_id!(
    NormalizedListingId,
    "Identifies a [`crate::NormalizedListing`]."
);
uuid_id!(SellerId, "Identifies a [`crate::Seller`].");
uuid_id!(ScoreId, "Identifies a [`crate::Score`].");
