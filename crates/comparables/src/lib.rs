//! The Comparables Engine: peer selection, descriptive pricing statistics,
//! and a cached analysis per listing, per spec §4.6.

#![deny(missing_docs)]

pub mod peers;
pub mod stats;

use carscout_model::{Comparables, MarketPosition, NormalizedListing, NormalizedListingId};
use carscout_shared::{Insufficient, PipelineConfig, StageError};
use carscout_storage::Storage;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;

/// Algorithm version tag persisted on every `Comparables` row, bumped when
/// the statistics method or peer-selection rules change meaningfully.
pub const MODEL_VERSION: &str = "comparables-v1";

/// The outcome of [`ComparablesEngine::analyze`].
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// A usable analysis, either freshly computed or served from cache.
    Ready(Comparables),
    /// The peer sample fell below the configured minimum.
    Insufficient(Insufficient),
}

/// The Comparables Engine component.
pub struct ComparablesEngine {
    storage: Storage,
    config: PipelineConfig,
}

impl ComparablesEngine {
    /// Builds a `ComparablesEngine` over a storage handle and pipeline
    /// config.
    pub fn new(storage: Storage, config: PipelineConfig) -> Self {
        Self { storage, config }
    }

    /// `analyze(listing)` → ComparablesResult | Insufficient, per spec §4.6.
    ///
    /// Serves the cached `Comparables` row when it is still fresh (younger
    /// than `cache_ttl_hours` and the subject's price hasn't changed since).
    pub async fn analyze(
        &self,
        listing_id: NormalizedListingId,
    ) -> Result<AnalysisOutcome, StageError> {
        let listing = self
            .storage
            .get_normalized_listing(listing_id)
            .await
            .map_err(StageError::from)?;

        let cfg = &self.config.comparables;
        let now = Utc::now();

        if let Some(cached) = self
            .storage
            .get_comparables(listing_id)
            .await
            .map_err(StageError::from)?
        {
            let price_changed = listing
                .price
                .and_then(|p| p.to_f64())
                .is_some_and(|p| (p - cached_subject_price(&cached)).abs() > 0.01);
            if cached.is_fresh(now, cfg.cache_ttl_hours, price_changed) {
                return Ok(AnalysisOutcome::Ready(cached));
            }
        }

        let (Some(brand), Some(model)) = (listing.brand.clone(), listing.model.clone()) else {
            return Ok(AnalysisOutcome::Insufficient(Insufficient { sample_size: 0 }));
        };

        let freshness_cutoff = now - chrono::Duration::days(cfg.freshness_days);
        let base_candidates = self
            .storage
            .select_comparable_candidates(brand, model, cfg.min_peer_price, freshness_cutoff)
            .await
            .map_err(StageError::from)?
            .into_iter()
            .filter(|c| c.id != listing.id)
            .collect::<Vec<_>>();

        let peers = peers::select(&listing, base_candidates, cfg);

        if peers.len() < cfg.min_sample {
            tracing::debug!(
                listing_id = %listing_id,
                sample_size = peers.len(),
                "comparables sample below minimum"
            );
            return Ok(AnalysisOutcome::Insufficient(Insufficient {
                sample_size: peers.len(),
            }));
        }

        let prices: Vec<f64> = peers
            .iter()
            .filter_map(|p| p.price)
            .filter_map(|p| p.to_f64())
            .collect();
        let s = stats::compute(&prices);

        let subject_price = listing.price.and_then(|p| p.to_f64()).unwrap_or(s.p50);
        let discount_pct = if s.p50 != 0.0 {
            (s.p50 - subject_price) / s.p50 * 100.0
        } else {
            0.0
        };

        let confidence = stats::confidence(peers.len(), cfg.full_confidence_sample, &s);

        let comp = Comparables {
            listing_id,
            sample_size: peers.len(),
            mean: s.mean,
            std_dev: s.std_dev,
            p10: s.p10,
            p25: s.p25,
            p50: s.p50,
            p75: s.p75,
            p90: s.p90,
            discount_pct,
            market_position: MarketPosition::from_price_percentiles(
                subject_price,
                s.p10,
                s.p25,
                s.p75,
            ),
            confidence,
            feature_vector: vec![
                listing.year.map(|y| y as f64).unwrap_or(0.0),
                listing.mileage.map(|m| m as f64).unwrap_or(0.0),
            ],
            model_version: MODEL_VERSION.to_string(),
            computed_at: now,
        };

        let saved = self
            .storage
            .put_comparables(comp)
            .await
            .map_err(StageError::from)?;
        Ok(AnalysisOutcome::Ready(saved))
    }
}

/// Recovers the subject price that was current when `cached` was computed,
/// from `p50` and `discount_pct`: `price = p50 × (1 − discount_pct / 100)`.
fn cached_subject_price(cached: &Comparables) -> f64 {
    cached.p50 * (1.0 - cached.discount_pct / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_subject_price_round_trips_discount() {
        let cached = Comparables {
            listing_id: NormalizedListingId::new(),
            sample_size: 10,
            mean: 20000.0,
            std_dev: 1000.0,
            p10: 18000.0,
            p25: 19000.0,
            p50: 20000.0,
            p75: 21000.0,
            p90: 22000.0,
            discount_pct: 10.0,
            market_position: MarketPosition::Cheap,
            confidence: 0.8,
            feature_vector: vec![],
            model_version: MODEL_VERSION.to_string(),
            computed_at: Utc::now(),
        };
        assert!((cached_subject_price(&cached) - 18000.0).abs() < 1e-6);
    }
}
