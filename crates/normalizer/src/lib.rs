//! The Normalizer: canonicalizes brand/model/fuel/gearbox/body, range-
//! validates year/mileage, converts price to canonical currency, computes
//! the description digest, and upserts the owning `NormalizedListing`.
//!
//! Grounded on `asset_sync::manifest::repo`'s upsert-with-version-bump
//! pattern, adapted to this pipeline's field-canonicalization rules.

#![deny(missing_docs)]

pub mod brand_model;
pub mod currency;
pub mod hash;
pub mod range;
pub mod synonyms;

use carscout_model::{FieldMap, NormalizedListing, NormalizedListingId, RawListing};
use carscout_shared::StageError;
use carscout_storage::Storage;
use chrono::Utc;

pub use brand_model::BrandModelCache;
pub use currency::FxRates;

/// The Normalizer component. Holds the in-process canonical-vocabulary
/// cache and FX rate table refreshed/constructed at stage-worker startup,
/// per spec §5's shared-resource policy.
pub struct Normalizer {
    storage: Storage,
    brand_models: BrandModelCache,
    fx: FxRates,
}

impl Normalizer {
    /// Builds a `Normalizer` over an already-loaded brand/model cache.
    pub fn new(storage: Storage, brand_models: BrandModelCache, fx: FxRates) -> Self {
        Self {
            storage,
            brand_models,
            fx,
        }
    }

    /// Builds a `Normalizer`, loading the active `CanonicalBrandModel` table
    /// from storage and using the default FX rate table.
    pub async fn load(storage: Storage) -> Result<Self, StageError> {
        let rows = storage
            .load_canonical_brand_models()
            .await
            .map_err(StageError::from)?;
        Ok(Self::new(storage, BrandModelCache::new(rows), FxRates::default()))
    }

    /// `normalize(raw_id)`: the Normalizer's sole operation, per spec §4.4.
    ///
    /// Returns `Ok(None)` when extraction hasn't produced a `FieldMap` yet
    /// (deferred, not failed, per the Normalizer's failure policy).
    pub async fn normalize(
        &self,
        raw: &RawListing,
    ) -> Result<Option<NormalizedListingId>, StageError> {
        let Some(field_map) = raw.parsed_map.clone() else {
            return Ok(None);
        };

        let now = Utc::now();
        let existing = self
            .storage
            .get_normalized_listing_by_raw(raw.id)
            .await
            .map_err(StageError::from)?;

        let canonical = field_map
            .brand
            .as_deref()
            .zip(field_map.model.as_deref())
            .and_then(|(b, m)| self.brand_models.canonicalize(b, m));

        let fuel = field_map.fuel.as_deref().and_then(synonyms::normalize_fuel);
        let gearbox = field_map
            .gearbox
            .as_deref()
            .and_then(synonyms::normalize_gearbox);
        let body = field_map.body.as_deref().and_then(synonyms::normalize_body);

        let year = range::validate_year(field_map.year, now);
        let mileage = range::validate_mileage(field_map.mileage);

        let price = match (field_map.price, field_map.currency.as_ref()) {
            (Some(amount), Some(cur)) => self.fx.to_local(amount, cur),
            _ => None,
        };

        let description_hash = field_map.description.as_deref().map(hash::description_hash);

        let seller_id = match field_map.phone.as_deref() {
            Some(phone) => Some(
                self.storage
                    .get_or_create_seller(hash::phone_hash(phone), None)
                    .await
                    .map_err(StageError::from)?
                    .id,
            ),
            None => None,
        };

        let candidate = build_candidate(
            &existing,
            raw,
            &field_map,
            canonical.as_ref(),
            fuel,
            gearbox,
            body,
            year,
            mileage,
            price,
            description_hash,
            seller_id,
        );

        let is_first_creation = existing.is_none();
        let same_as_before = existing.as_ref() == Some(&candidate);

        let saved = if same_as_before {
            candidate
        } else {
            let mut to_write = candidate;
            if let Some(prior) = &existing {
                to_write.version = prior.version + 1;
            }
            self.storage
                .upsert_normalized_listing(to_write)
                .await
                .map_err(StageError::from)?
        };

        if is_first_creation {
            self.storage
                .enqueue_stage("dedupe".to_string(), saved.id.as_uuid())
                .await
                .map_err(StageError::from)?;
        }

        Ok(Some(saved.id))
    }
}

#[allow(clippy::too_many_arguments)]
fn build_candidate(
    existing: &Option<NormalizedListing>,
    raw: &RawListing,
    field_map: &FieldMap,
    canonical: Option<&brand_model::Canonicalized>,
    fuel: Option<carscout_model::FuelType>,
    gearbox: Option<carscout_model::GearboxType>,
    body: Option<carscout_model::BodyType>,
    year: Option<i32>,
    mileage: Option<i64>,
    price: Option<rust_decimal::Decimal>,
    description_hash: Option<String>,
    seller_id: Option<carscout_model::SellerId>,
) -> NormalizedListing {
    let id = existing
        .as_ref()
        .map(|e| e.id)
        .unwrap_or_else(NormalizedListingId::new);
    let (is_duplicate, canonical_of) = existing
        .as_ref()
        .map(|e| (e.is_duplicate, e.canonical_of))
        .unwrap_or((false, None));
    let version = existing.as_ref().map(|e| e.version).unwrap_or(0);

    NormalizedListing {
        id,
        raw_listing_id: raw.id,
        brand: canonical.map(|c| c.brand.clone()),
        model: canonical.map(|c| c.model.clone()),
        year,
        mileage,
        fuel,
        gearbox,
        body,
        price,
        region: field_map.region.clone(),
        title: field_map.title.clone(),
        description: field_map.description.clone(),
        description_hash,
        version,
        is_duplicate,
        canonical_of,
        seller_id,
        first_seen_at: raw.first_seen_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carscout_model::{Currency, RawListingId, SourceId};
    use rust_decimal_macros::dec;

    fn raw_with_field_map(field_map: Option<FieldMap>) -> RawListing {
        RawListing {
            id: RawListingId::new(),
            source_id: SourceId::new(),
            site_ad_id: "ad-1".into(),
            url: "https://example.test/ad-1".into(),
            raw_html: None,
            parsed_map: field_map,
            first_seen_at: Utc::now(),
            last_seen_at: Utc::now(),
            active: true,
            http_meta: Default::default(),
            parse_errors: None,
        }
    }

    #[test]
    fn candidate_drops_canonical_fields_when_unmatched() {
        let raw = raw_with_field_map(None);
        let field_map = FieldMap {
            brand: Some("Lada".into()),
            model: Some("Niva".into()),
            price: Some(dec!(5000)),
            currency: Some(Currency::Local),
            ..Default::default()
        };
        let candidate = build_candidate(
            &None, &raw, &field_map, None, None, None, None, None, None, None, None, None,
        );
        assert!(candidate.brand.is_none());
        assert_eq!(candidate.version, 0);
        assert!(!candidate.is_duplicate);
    }

    #[test]
    fn version_is_preserved_from_existing_row_in_candidate() {
        let raw = raw_with_field_map(None);
        let field_map = FieldMap::default();
        let existing = build_candidate(
            &None, &raw, &field_map, None, None, None, None, None, None, None, None, None,
        );
        let mut prior = existing.clone();
        prior.version = 4;
        let candidate = build_candidate(
            &Some(prior),
            &raw,
            &field_map,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        );
        assert_eq!(candidate.version, 4);
    }
}
