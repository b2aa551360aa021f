//! Entities and value types of the core evaluation pipeline's data model.
//!
//! These types mirror the tables owned by `carscout-storage` (see its
//! embedded migrations and `schema.rs`) and are shared by every pipeline
//! stage crate so they agree on the shape of a listing as it moves through
//! ingestion, extraction, normalization, deduplication, pricing and scoring.

#![deny(missing_docs)]

pub mod canonical;
pub mod comparables;
pub mod currency;
pub mod dedupe;
pub mod evaluation;
pub mod field_map;
pub mod ids;
pub mod price_history;
pub mod raw_listing;
pub mod score;
pub mod seller;
pub mod source;

pub use canonical::{BodyType, CanonicalBrandModel, FuelType, GearboxType};
pub use comparables::{Comparables, MarketPosition};
pub use currency::Currency;
pub use dedupe::{DedupeMethod, DedupeSignature, DuplicateLog};
pub use evaluation::{Evaluation, RiskLevel};
pub use field_map::FieldMap;
pub use ids::{
    NormalizedListingId, RawListingId, ScoreId, SellerId, SourceId,
};
pub use price_history::PriceHistoryEntry;
pub use raw_listing::{HttpMeta, RawListing};
pub use score::{FinalState, Score};
pub use seller::Seller;
pub use source::Source;

/// A normalized, canonical listing record.
pub mod normalized_listing;
pub use normalized_listing::NormalizedListing;
