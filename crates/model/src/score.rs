//! The `Score` entity: final rating and decision per listing.

use crate::ids::NormalizedListingId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal classification of a [`crate::Score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalState {
    /// Provisional: neither clearly good nor clearly bad.
    Draft,
    /// Meets the approval bar; eligible for notification fan-out.
    Approved,
    /// Disqualified, either by a red flag or by falling below the floor.
    Rejected,
}

/// The final rating for one [`crate::NormalizedListing`].
///
/// At most one `Score` exists per listing; re-scoring replaces the row in
/// place rather than appending a history (contrast [`crate::PriceHistoryEntry`],
/// which is append-only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// The listing this score describes.
    pub listing_id: NormalizedListingId,
    /// Numeric score in `[0, 10]`, rounded to 2 decimals.
    pub value: f64,
    /// Human-readable reasons for the score/decision, in generation order.
    pub reasons: Vec<String>,
    /// Contribution from the quality/freshness component attributable to
    /// listing recency (kept distinct for the monitor's re-scoring logic).
    pub freshness_bonus: f64,
    /// Placeholder for a future liquidity signal; currently always 0.0 —
    /// the original scorer has no liquidity model to ground this on.
    pub liquidity_factor: f64,
    /// Contribution subtracted (already folded into `value`) for risk.
    /// Kept as a separate field for explainability/debugging.
    pub risk_penalty: f64,
    /// Resulting decision.
    pub final_state: FinalState,
    /// When this score was computed.
    pub scored_at: DateTime<Utc>,
}

impl Score {
    /// The idempotency key used for outbound notification, per §6:
    /// `hash(listing_id, score_value, scored_at)`.
    pub fn notification_idempotency_key(&self) -> String {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.listing_id.as_uuid().hash(&mut hasher);
        self.value.to_bits().hash(&mut hasher);
        self.scored_at.timestamp_nanos_opt().unwrap_or(0).hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}
