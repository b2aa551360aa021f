//! The `PriceHistory` entity: an append-only log of observed prices.

use crate::ids::NormalizedListingId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One observed price point for a [`crate::NormalizedListing`].
///
/// Rows are never updated or deleted; this is what lets the Monitor detect
/// price drops by diffing against the most recent entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    /// The listing this price was observed for.
    pub listing_id: NormalizedListingId,
    /// Price in canonical currency at the time of observation.
    pub price: Decimal,
    /// When this price was observed.
    pub observed_at: DateTime<Utc>,
}
