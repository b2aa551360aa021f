//! The Deduplicator: fixed-order, highest-confidence-first duplicate
//! detection, per spec §4.5.
//!
//! Grounded on the original `DeduplicationEngine`'s four-tier
//! `find_duplicate` chain, adapted to this pipeline's storage layer and to
//! the explicit "never a duplicate of a younger listing" tie-break rule.

#![deny(missing_docs)]

pub mod signature;
pub mod similarity;

use carscout_model::{DedupeMethod, DuplicateLog, NormalizedListing, NormalizedListingId};
use carscout_shared::{PipelineConfig, StageError};
use carscout_storage::Storage;
use chrono::Utc;
use rust_decimal::Decimal;

/// The Deduplicator component.
pub struct Deduplicator {
    storage: Storage,
    config: PipelineConfig,
}

/// A candidate match found by one of the four tiers.
struct Match {
    target: NormalizedListing,
    method: DedupeMethod,
    score: f64,
}

impl Deduplicator {
    /// Builds a `Deduplicator` over a storage handle and pipeline config.
    pub fn new(storage: Storage, config: PipelineConfig) -> Self {
        Self { storage, config }
    }

    /// `dedupe(listing_id)`: the Deduplicator's sole operation.
    ///
    /// Idempotent: a listing already marked a duplicate is left untouched.
    pub async fn dedupe(&self, listing_id: NormalizedListingId) -> Result<(), StageError> {
        let mut listing = self
            .storage
            .get_normalized_listing(listing_id)
            .await
            .map_err(StageError::from)?;
        if listing.is_duplicate {
            return Ok(());
        }

        let raw = self
            .storage
            .get_raw_listing(listing.raw_listing_id)
            .await
            .map_err(StageError::from)?;
        let field_map = raw.parsed_map.clone().unwrap_or_default();

        let sig = signature::build(&listing, &field_map);
        self.storage
            .put_dedupe_signature(sig.clone())
            .await
            .map_err(StageError::from)?;

        let same_source_candidates = self
            .storage
            .select_dedupe_candidates_in_source(raw.source_id)
            .await
            .map_err(StageError::from)?
            .into_iter()
            .filter(|c| c.id != listing.id)
            .collect::<Vec<_>>();

        let found = match self.tier_phone(&listing).await? {
            Some(m) => Some(m),
            None => match self.tier_image(&listing, &sig, &same_source_candidates).await? {
                Some(m) => Some(m),
                None => match self.tier_title_trigram(&sig, &same_source_candidates) {
                    Some(m) => Some(m),
                    None => self.tier_embedding(&sig, &same_source_candidates).await?,
                },
            },
        };

        match found {
            Some(m) => {
                tracing::info!(
                    listing_id = %listing.id,
                    canonical_of = %m.target.id,
                    method = ?m.method,
                    score = m.score,
                    "marked as duplicate"
                );
                listing.is_duplicate = true;
                listing.canonical_of = Some(m.target.id);
                listing.version += 1;
                self.storage
                    .upsert_normalized_listing(listing.clone())
                    .await
                    .map_err(StageError::from)?;
                self.storage
                    .insert_duplicate_log(DuplicateLog {
                        listing_id: listing.id,
                        canonical_of: m.target.id,
                        method: m.method,
                        score: m.score,
                        decided_at: Utc::now(),
                    })
                    .await
                    .map_err(StageError::from)?;
            }
            None => {
                tracing::debug!(listing_id = %listing.id, "canonical, advancing to comparables");
                self.storage
                    .enqueue_stage("comparables".to_string(), listing.id.as_uuid())
                    .await
                    .map_err(StageError::from)?;
            }
        }

        Ok(())
    }

    /// Tier 1: seller phone-hash + same brand/model + price within
    /// `phone_price_tolerance_pct`.
    async fn tier_phone(&self, listing: &NormalizedListing) -> Result<Option<Match>, StageError> {
        let (Some(seller_id), Some(brand), Some(model), Some(price)) = (
            listing.seller_id,
            listing.brand.as_deref(),
            listing.model.as_deref(),
            listing.price,
        ) else {
            return Ok(None);
        };

        let tolerance: Decimal = format!("{:.4}", self.config.dedupe.phone_price_tolerance_pct)
            .parse()
            .unwrap_or(Decimal::new(10, 2));
        let low = price * (Decimal::ONE - tolerance);
        let high = price * (Decimal::ONE + tolerance);

        let candidates = self
            .storage
            .select_listings_by_seller(seller_id)
            .await
            .map_err(StageError::from)?;

        let matched = candidates
            .into_iter()
            .filter(|c| c.id != listing.id)
            .filter(|c| c.brand.as_deref() == Some(brand) && c.model.as_deref() == Some(model))
            .filter(|c| c.price.is_some_and(|p| p >= low && p <= high))
            .collect::<Vec<_>>();

        Ok(oldest(matched).map(|target| Match {
            target,
            method: DedupeMethod::SellerPhoneMatch,
            score: DedupeMethod::SellerPhoneMatch.confidence(),
        }))
    }

    /// Tier 2: first-image perceptual-hash equality within the same Source.
    async fn tier_image(
        &self,
        listing: &NormalizedListing,
        sig: &carscout_model::DedupeSignature,
        candidates: &[NormalizedListing],
    ) -> Result<Option<Match>, StageError> {
        let Some(phash) = sig.first_image_phash else {
            return Ok(None);
        };

        let mut matched = Vec::new();
        for candidate in candidates {
            if candidate.id == listing.id {
                continue;
            }
            if let Some(other_sig) = self
                .storage
                .get_dedupe_signature(candidate.id)
                .await
                .map_err(StageError::from)?
            {
                if other_sig.first_image_phash == Some(phash) {
                    matched.push(candidate.clone());
                }
            }
        }

        Ok(oldest(matched).map(|target| Match {
            target,
            method: DedupeMethod::ImagePhashMatch,
            score: DedupeMethod::ImagePhashMatch.confidence(),
        }))
    }

    /// Tier 3: title trigram similarity against non-duplicate listings in
    /// the same Source. Always attempted.
    fn tier_title_trigram(
        &self,
        sig: &carscout_model::DedupeSignature,
        candidates: &[NormalizedListing],
    ) -> Option<Match> {
        let threshold = self.config.dedupe.text_similarity_threshold;
        let mut best: Option<(NormalizedListing, f64)> = None;
        for candidate in candidates {
            let candidate_source =
                signature::trigram_source(candidate.title.as_deref().unwrap_or_default());
            let score = signature::trigram_similarity(&sig.title_trigram_source, &candidate_source);
            if score >= threshold {
                let better = match best.as_ref() {
                    None => true,
                    Some((b, s)) => score > *s || (score == *s && candidate.first_seen_at < b.first_seen_at),
                };
                if better {
                    best = Some((candidate.clone(), score));
                }
            }
        }
        best.map(|(target, score)| Match {
            target,
            method: DedupeMethod::TitleTrigramMatch,
            score,
        })
    }

    /// Tier 4: text-embedding cosine similarity, only when enabled and both
    /// signatures carry an embedding.
    async fn tier_embedding(
        &self,
        sig: &carscout_model::DedupeSignature,
        candidates: &[NormalizedListing],
    ) -> Result<Option<Match>, StageError> {
        if !self.config.dedupe.embedding_enabled {
            return Ok(None);
        }
        let Some(embedding) = &sig.text_embedding else {
            return Ok(None);
        };
        let threshold = self.config.dedupe.embedding_threshold;

        let mut best: Option<(NormalizedListing, f64)> = None;
        for candidate in candidates {
            let Some(other_sig) = self
                .storage
                .get_dedupe_signature(candidate.id)
                .await
                .map_err(StageError::from)?
            else {
                continue;
            };
            let Some(other_embedding) = other_sig.text_embedding else {
                continue;
            };
            let score = similarity::cosine_similarity(embedding, &other_embedding);
            if score >= threshold {
                let better = match best.as_ref() {
                    None => true,
                    Some((b, s)) => score > *s || (score == *s && candidate.first_seen_at < b.first_seen_at),
                };
                if better {
                    best = Some((candidate.clone(), score));
                }
            }
        }
        Ok(best.map(|(target, score)| Match {
            target,
            method: DedupeMethod::EmbeddingMatch,
            score,
        }))
    }
}

/// Picks the oldest-by-`first_seen_at` listing from a candidate set,
/// enforcing that a listing never becomes a duplicate of a younger one.
fn oldest(mut candidates: Vec<NormalizedListing>) -> Option<NormalizedListing> {
    candidates.sort_by_key(|c| c.first_seen_at);
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_picks_minimum_first_seen_at() {
        let base = Utc::now();
        let newer = NormalizedListing {
            id: NormalizedListingId::new(),
            raw_listing_id: carscout_model::RawListingId::new(),
            brand: None,
            model: None,
            year: None,
            mileage: None,
            fuel: None,
            gearbox: None,
            body: None,
            price: None,
            region: None,
            title: None,
            description: None,
            description_hash: None,
            version: 0,
            is_duplicate: false,
            canonical_of: None,
            seller_id: None,
            first_seen_at: base,
        };
        let mut older = newer.clone();
        older.id = NormalizedListingId::new();
        older.first_seen_at = base - chrono::Duration::days(1);

        let picked = oldest(vec![newer, older.clone()]).unwrap();
        assert_eq!(picked.id, older.id);
    }
}
