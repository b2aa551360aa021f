//! Deduplication entities: `DedupeSignature` and `DuplicateLog`.

use crate::ids::NormalizedListingId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Precomputed signals used by the Deduplicator, one row per
/// [`crate::NormalizedListing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupeSignature {
    /// The listing these signals describe.
    pub listing_id: NormalizedListingId,
    /// Title, normalized for trigram indexing (lowercased, whitespace
    /// collapsed).
    pub title_trigram_source: String,
    /// MinHash signature of the title, used for fast near-duplicate lookup.
    pub title_minhash: Vec<u64>,
    /// MinHash signature of the description.
    pub description_minhash: Vec<u64>,
    /// Perceptual hash of the first (primary) image, when one was present.
    pub first_image_phash: Option<u64>,
    /// Optional dense text embedding, computed lazily and reused across the
    /// cosine-similarity tier.
    pub text_embedding: Option<Vec<f32>>,
}

/// The method tier that decided a duplicate match, in descending confidence
/// order. Order here matches the Deduplicator's fixed evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupeMethod {
    /// Seller phone-hash + same brand/model + price within ±10%.
    SellerPhoneMatch,
    /// First-image perceptual-hash equality within the same Source.
    ImagePhashMatch,
    /// Title trigram similarity against non-duplicate listings in the same
    /// Source.
    TitleTrigramMatch,
    /// Text-embedding cosine similarity (optional tier).
    EmbeddingMatch,
}

impl DedupeMethod {
    /// The fixed confidence value associated with this method, per the
    /// Deduplicator's method table.
    pub fn confidence(self) -> f64 {
        match self {
            DedupeMethod::SellerPhoneMatch => 0.95,
            DedupeMethod::ImagePhashMatch => 0.90,
            DedupeMethod::TitleTrigramMatch => 0.75,
            DedupeMethod::EmbeddingMatch => 0.80,
        }
    }
}

/// An append-only audit entry for one duplicate decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateLog {
    /// The listing that was marked as a duplicate.
    pub listing_id: NormalizedListingId,
    /// The canonical listing it was matched to (after any path
    /// compression).
    pub canonical_of: NormalizedListingId,
    /// The method tier that fired.
    pub method: DedupeMethod,
    /// The raw similarity/match score produced by that method.
    pub score: f64,
    /// When this decision was recorded.
    pub decided_at: DateTime<Utc>,
}
