//! The `Seller` entity: an identity aggregated by hashed phone.

use crate::ids::SellerId;
use serde::{Deserialize, Serialize};

/// An identity aggregated by hashed phone number. Created on first phone
/// observation during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    /// Surrogate identifier.
    pub id: SellerId,
    /// Stable hash of the seller's phone number. Unique.
    pub phone_hash: String,
    /// Seller-provided display name, when observed.
    pub name: Option<String>,
    /// Number of distinct listings attributed to this seller.
    pub contact_count: i64,
    /// Whether this seller has been manually or automatically blacklisted.
    ///
    /// A blacklisted seller degrades Scorer confidence and adds a reason
    /// string rather than unconditionally rejecting (see `carscout-scorer`).
    pub blacklisted: bool,
}
