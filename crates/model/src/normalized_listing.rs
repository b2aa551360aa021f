//! The `NormalizedListing` entity: a canonical, normalized record.

use crate::ids::{NormalizedListingId, RawListingId, SellerId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A canonical record produced by the Normalizer from a single
/// [`crate::RawListing`].
///
/// **Invariants** (enforced by `carscout-storage` at write time):
/// - Exactly one `NormalizedListing` per `RawListing`.
/// - `is_duplicate ⇒ canonical_of.is_some() ∧` the referenced listing is
///   itself non-duplicate and in the same Source (path-compressed, so
///   chains of length > 1 are never observable).
/// - `brand`/`model`, when set, reference known canonical values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedListing {
    /// Surrogate identifier.
    pub id: NormalizedListingId,
    /// The raw document this record was normalized from. 1:1.
    pub raw_listing_id: RawListingId,
    /// Canonical brand, when resolved by the Normalizer.
    pub brand: Option<String>,
    /// Canonical model, when resolved by the Normalizer.
    pub model: Option<String>,
    /// Manufacture year, range-validated to `1900..=current_year + 1`.
    pub year: Option<i32>,
    /// Odometer reading in kilometers, range-validated to `0..=1_000_000`.
    pub mileage: Option<i64>,
    /// Canonicalized fuel type.
    pub fuel: Option<crate::canonical::FuelType>,
    /// Canonicalized gearbox type.
    pub gearbox: Option<crate::canonical::GearboxType>,
    /// Canonicalized body type.
    pub body: Option<crate::canonical::BodyType>,
    /// Asking price, converted to the region's canonical currency.
    pub price: Option<Decimal>,
    /// Region/locality, as supplied by the extractor.
    pub region: Option<String>,
    /// Listing title.
    pub title: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Stable cryptographic digest of the normalized (whitespace-collapsed,
    /// case-folded) description, used to dedupe identical text and to key
    /// the LLM collaborator's cache.
    pub description_hash: Option<String>,
    /// Optimistic-concurrency / change counter. Increments on any field
    /// change; never on a no-op re-normalization.
    pub version: i64,
    /// Whether this listing has been marked as a duplicate of another.
    /// Monotonic: once set, never cleared.
    pub is_duplicate: bool,
    /// The canonical listing this one is a duplicate of, when
    /// `is_duplicate` is set. Append-only: not revised once written, except
    /// by path-compression chasing further along the same chain.
    pub canonical_of: Option<NormalizedListingId>,
    /// The seller this listing is attributed to, when a phone was
    /// extracted.
    pub seller_id: Option<SellerId>,
    /// When the owning `RawListing` was first observed. Duplicated here
    /// (denormalized from the raw listing) because the Monitor's periodic
    /// pass and the Scorer's freshness component both key off it heavily.
    pub first_seen_at: DateTime<Utc>,
}

impl NormalizedListing {
    /// Age of the vehicle in whole years, given "now" as a reference point.
    pub fn age_years(&self, now: DateTime<Utc>) -> Option<i32> {
        use chrono::Datelike;
        self.year.map(|y| (now.year() - y).max(0))
    }

    /// Whether this listing is eligible to be treated as canonical (i.e.
    /// never a duplicate, so candidates may point to it).
    pub fn is_canonical_root(&self) -> bool {
        !self.is_duplicate
    }
}
