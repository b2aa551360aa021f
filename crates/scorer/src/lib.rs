//! The Scorer: red-flag gate, market-data gate, price-bracket selection,
//! weighted component scoring, and the approve/draft/reject decision, per
//! spec §4.7.
//!
//! Grounded on `libs/domain/market_aware_scoring.py`'s `MarketAwareRatingEngine`:
//! the bracket table, component weights, and reason-generation order are
//! carried over verbatim; only the red-flag category names and the
//! blacklist/market-position extras follow this workspace's own model.

#![deny(missing_docs)]

pub mod brackets;
pub mod components;
pub mod red_flags;

use brackets::Bracket;
use carscout_comparables::{AnalysisOutcome, ComparablesEngine};
use carscout_model::{
    Evaluation, FinalState, MarketPosition, NormalizedListing, NormalizedListingId, RiskLevel,
    Score,
};
use carscout_shared::{config::MarketDataPolicy, PipelineConfig, StageError};
use carscout_storage::Storage;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;

/// Rule-set version tag persisted on every `Evaluation` row.
pub const MODEL_VERSION: &str = "scorer-v1";

/// The Scorer component. Owns a `ComparablesEngine` since the Orchestrator
/// always invokes comparables-and-score as one combined stage (§4.8).
pub struct Scorer {
    storage: Storage,
    config: PipelineConfig,
    comparables: ComparablesEngine,
}

impl Scorer {
    /// Builds a `Scorer` over a storage handle and pipeline config.
    pub fn new(storage: Storage, config: PipelineConfig) -> Self {
        let comparables = ComparablesEngine::new(storage.clone(), config.clone());
        Self {
            storage,
            config,
            comparables,
        }
    }

    /// `score(listing)`: the Scorer's sole operation, per spec §4.7.
    ///
    /// Idempotent: unchanged inputs (listing fields, comparables, config)
    /// produce the same score, reasons, and decision every time; only
    /// `scored_at` differs.
    pub async fn score(&self, listing_id: NormalizedListingId) -> Result<Score, StageError> {
        let listing = self
            .storage
            .get_normalized_listing(listing_id)
            .await
            .map_err(StageError::from)?;
        let raw = self
            .storage
            .get_raw_listing(listing.raw_listing_id)
            .await
            .map_err(StageError::from)?;
        let field_map = raw.parsed_map.clone().unwrap_or_default();
        let now = Utc::now();

        let flags = red_flags::detect(&listing, &field_map, now, &self.config.locale);
        if let Some(first) = flags.first() {
            self.put_evaluation(
                listing_id,
                flags.iter().map(|f| f.id.to_string()).collect(),
                RiskLevel::High,
                1.0,
                now,
            )
            .await?;
            return self
                .finalize(listing_id, 0.0, vec![first.detail.clone()], FinalState::Rejected, 0.0, now)
                .await;
        }

        let Some(price) = listing.price.and_then(|p| p.to_f64()).filter(|p| *p > 0.0) else {
            self.put_evaluation(listing_id, vec![], RiskLevel::Medium, 0.5, now).await?;
            return self
                .finalize(listing_id, 0.0, vec!["invalid price".into()], FinalState::Rejected, 0.0, now)
                .await;
        };

        let outcome = self.comparables.analyze(listing_id).await?;
        let market_data_required = self.config.market_data_policy == MarketDataPolicy::Required;

        let (sample_size, discount_pct, market_position, market_confidence) = match &outcome {
            AnalysisOutcome::Ready(c) => (c.sample_size, c.discount_pct, Some(c.market_position), c.confidence),
            AnalysisOutcome::Insufficient(ins) => (ins.sample_size, 0.0, None, 0.0),
        };
        let is_insufficient = matches!(outcome, AnalysisOutcome::Insufficient(_));

        if is_insufficient && market_data_required {
            self.put_evaluation(listing_id, vec![], RiskLevel::Low, 0.9, now).await?;
            return self
                .finalize(
                    listing_id,
                    0.0,
                    vec!["insufficient market data".into()],
                    FinalState::Rejected,
                    0.0,
                    now,
                )
                .await;
        }

        let bracket = Bracket::for_price(price);
        let thresholds = bracket.discount_thresholds();
        let age_years = listing.age_years(now).unwrap_or(0);

        let price_comp = components::price(discount_pct, thresholds);
        let age_comp = components::age(age_years);
        let mileage_comp = components::mileage(listing.mileage, age_years, bracket);
        let mut confidence_comp = components::confidence(sample_size);
        let _ = market_confidence;

        let mut reasons = Vec::new();
        if let Some(seller_id) = listing.seller_id {
            let seller = self.storage.get_seller(seller_id).await.map_err(StageError::from)?;
            if seller.blacklisted {
                confidence_comp = (confidence_comp - 0.2).max(0.0);
                reasons.push("seller blacklisted: confidence reduced".to_string());
            }
        }

        let quality_inputs = components::QualityInputs {
            description_len: listing.description.as_deref().map(str::len).unwrap_or(0),
            image_count: field_map.image_urls.len(),
            listing_age_hours: (now - listing.first_seen_at).num_seconds() as f64 / 3600.0,
        };
        let (quality_comp, freshness_bonus) = components::quality(quality_inputs);

        let raw_total = price_comp + age_comp + mileage_comp + confidence_comp + quality_comp;
        let value = (raw_total.clamp(0.0, 10.0) * 100.0).round() / 100.0;

        reasons.extend(generate_reasons(
            discount_pct,
            market_position,
            sample_size,
            age_comp,
            mileage_comp,
            quality_comp,
            listing.mileage,
            listing.year,
            bracket,
        ));

        let cfg = &self.config.scoring;
        let meets_approval = value >= cfg.approval_score_threshold
            && discount_pct >= cfg.approval_min_discount_pct
            && sample_size >= self.config.comparables.min_sample;

        let final_state = if value < cfg.draft_floor {
            FinalState::Rejected
        } else if meets_approval {
            FinalState::Approved
        } else {
            FinalState::Draft
        };

        self.put_evaluation(listing_id, vec![], RiskLevel::Low, 0.9, now).await?;
        self.finalize(listing_id, value, reasons, final_state, freshness_bonus, now).await
    }

    async fn put_evaluation(
        &self,
        listing_id: NormalizedListingId,
        red_flags: Vec<String>,
        risk_level: RiskLevel,
        rule_confidence: f64,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), StageError> {
        let eval = Evaluation {
            listing_id,
            red_flags,
            risk_level,
            llm_summary: None,
            rule_confidence,
            llm_confidence: None,
            rule_model_version: MODEL_VERSION.to_string(),
            llm_model_version: None,
            evaluated_at: now,
        };
        self.storage.put_evaluation(eval).await.map_err(StageError::from)?;
        Ok(())
    }

    async fn finalize(
        &self,
        listing_id: NormalizedListingId,
        value: f64,
        reasons: Vec<String>,
        final_state: FinalState,
        freshness_bonus: f64,
        now: chrono::DateTime<Utc>,
    ) -> Result<Score, StageError> {
        let score = Score {
            listing_id,
            value,
            reasons,
            freshness_bonus,
            liquidity_factor: 0.0,
            risk_penalty: 0.0,
            final_state,
            scored_at: now,
        };
        let saved = self.storage.put_score(score).await.map_err(StageError::from)?;

        if saved.final_state == FinalState::Approved {
            self.storage
                .enqueue_stage("notify".to_string(), listing_id.as_uuid())
                .await
                .map_err(StageError::from)?;
        }

        tracing::info!(
            listing_id = %listing_id,
            score = saved.value,
            state = ?saved.final_state,
            "listing scored"
        );

        Ok(saved)
    }
}

#[allow(clippy::too_many_arguments)]
fn generate_reasons(
    discount_pct: f64,
    market_position: Option<MarketPosition>,
    sample_size: usize,
    age_comp: f64,
    mileage_comp: f64,
    quality_comp: f64,
    mileage_km: Option<i64>,
    year: Option<i32>,
    bracket: Bracket,
) -> Vec<String> {
    let mut reasons = Vec::new();

    if discount_pct >= 25.0 {
        reasons.push(format!("excellent price: {discount_pct:.0}% below market"));
    } else if discount_pct >= 15.0 {
        reasons.push(format!("great price: {discount_pct:.0}% below market"));
    } else if discount_pct >= 10.0 {
        reasons.push(format!("good price: {discount_pct:.0}% below market"));
    }

    match market_position {
        Some(MarketPosition::VeryCheap) => {
            reasons.push(format!("bottom 10% of market ({sample_size} comparables)"))
        }
        Some(MarketPosition::Cheap) => {
            reasons.push(format!("bottom 25% of market ({sample_size} comparables)"))
        }
        _ => {}
    }

    if age_comp >= 1.8 {
        if let Some(y) = year {
            reasons.push(format!("recent year: {y}"));
        }
    }

    if mileage_comp >= 1.7 {
        if let Some(m) = mileage_km {
            reasons.push(format!("low mileage: {m} km"));
        }
    }

    if quality_comp >= 0.8 {
        reasons.push("well-documented listing".to_string());
    }

    if bracket == Bracket::SweetSpot {
        reasons.push("sweet spot price range (10k-30k)".to_string());
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> NormalizedListing {
        use carscout_model::{NormalizedListingId as Id, RawListingId};
        NormalizedListing {
            id: Id::new(),
            raw_listing_id: RawListingId::new(),
            brand: Some("Audi".into()),
            model: Some("A6".into()),
            year: Some(2019),
            mileage: Some(80_000),
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
            first_seen_at: Utc::now(),
        }
    }

    #[test]
    fn reasons_mention_discount_tier_and_bracket() {
        let _ = listing();
        let reasons = generate_reasons(24.0, Some(MarketPosition::Average), 22, 1.8, 1.7, 0.6, Some(80_000), Some(2019), Bracket::SweetSpot);
        assert!(reasons.iter().any(|r| r.contains("below market")));
        assert!(reasons.iter().any(|r| r.contains("sweet spot")));
        assert!(reasons.iter().any(|r| r.contains("recent year")));
        assert!(reasons.iter().any(|r| r.contains("low mileage")));
    }

    #[test]
    fn low_discount_yields_no_price_reason() {
        let reasons = generate_reasons(3.0, None, 6, 1.2, 0.8, 0.2, None, None, Bracket::Budget);
        assert!(reasons.iter().all(|r| !r.contains("below market")));
    }
}
