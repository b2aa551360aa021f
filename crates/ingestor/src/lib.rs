//! The Raw Ingestor: idempotent upsert of scraped documents by
//! `(source, site_ad_id)`, per spec §4.2.
//!
//! Grounded on `asset_sync`'s upsert-by-natural-key ingestion pattern,
//! adapted to this pipeline's re-observation rules (merge `http_meta`,
//! conditional `raw_html` replacement, price-change detection for the
//! Monitor).

#![deny(missing_docs)]

use carscout_model::{FieldMap, HttpMeta, PriceHistoryEntry, RawListing, RawListingId, SourceId};
use carscout_normalizer::FxRates;
use carscout_shared::StageError;
use carscout_storage::Storage;
use chrono::Utc;

/// The external inbound request a scraping front-end submits, per spec §6.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// Owning marketplace's surrogate id.
    pub source_id: SourceId,
    /// The marketplace's own ad identifier.
    pub site_ad_id: String,
    /// URL the document was fetched from.
    pub url: String,
    /// Raw HTML blob, when the front-end ships it.
    pub raw_html: Option<String>,
    /// Pre-parsed field map, when the front-end parses fields itself.
    pub parsed_map: Option<FieldMap>,
    /// HTTP-level metadata from this fetch.
    pub http_meta: HttpMeta,
}

/// The Raw Ingestor component.
pub struct Ingestor {
    storage: Storage,
    fx: FxRates,
}

impl Ingestor {
    /// Builds an `Ingestor` over a storage handle, using the default FX
    /// rate table to compare scraped prices against the canonical-currency
    /// price history.
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            fx: FxRates::default(),
        }
    }

    /// `ingest(...)`: the Raw Ingestor's sole operation, per spec §4.2.
    ///
    /// Returns the `RawListingId`, upserted by `(source, site_ad_id)`.
    /// Idempotent: repeated calls with identical inputs leave state
    /// unchanged beyond `last_seen_at`.
    pub async fn ingest(&self, req: IngestRequest) -> Result<RawListingId, StageError> {
        let now = Utc::now();
        let existing = self
            .storage
            .get_raw_listing_by_ad(req.source_id, req.site_ad_id.clone())
            .await
            .map_err(StageError::from)?;

        let saved = match existing {
            None => {
                let listing = RawListing {
                    id: RawListingId::new(),
                    source_id: req.source_id,
                    site_ad_id: req.site_ad_id,
                    url: req.url,
                    raw_html: req.raw_html,
                    parsed_map: req.parsed_map,
                    first_seen_at: now,
                    last_seen_at: now,
                    active: true,
                    http_meta: req.http_meta,
                    parse_errors: None,
                };
                let saved = self.storage.insert_raw_listing(listing).await.map_err(StageError::from)?;
                self.storage
                    .enqueue_stage("extract".to_string(), saved.id.as_uuid())
                    .await
                    .map_err(StageError::from)?;
                saved
            }
            Some(mut current) => {
                current.last_seen_at = now;
                current.active = true;
                current.http_meta.merge(req.http_meta);
                current.url = req.url;

                if let Some(candidate_html) = req.raw_html {
                    if current.should_replace_html(candidate_html.len()) {
                        current.raw_html = Some(candidate_html);
                    }
                }
                if req.parsed_map.is_some() {
                    current.parsed_map = req.parsed_map.clone();
                }

                let saved = self.storage.update_raw_listing(current).await.map_err(StageError::from)?;

                if let Some(field_map) = req.parsed_map {
                    self.record_price_change_if_any(saved.id, &field_map).await?;
                }
                saved
            }
        };

        tracing::info!(raw_listing_id = %saved.id, source_id = %req.source_id, "listing ingested");
        Ok(saved.id)
    }

    /// Records a `PriceHistory` entry when the newly scraped price differs
    /// from the most recently observed canonical-currency price. This is
    /// the signal the Monitor's periodic pass consumes.
    async fn record_price_change_if_any(
        &self,
        raw_listing_id: RawListingId,
        field_map: &FieldMap,
    ) -> Result<(), StageError> {
        let (Some(amount), Some(currency)) = (field_map.price, field_map.currency.as_ref()) else {
            return Ok(());
        };
        let Some(canonical_price) = self.fx.to_local(amount, currency) else {
            return Ok(());
        };

        let Some(normalized) = self
            .storage
            .get_normalized_listing_by_raw(raw_listing_id)
            .await
            .map_err(StageError::from)?
        else {
            return Ok(());
        };

        let latest = self.storage.latest_price(normalized.id).await.map_err(StageError::from)?;
        let price_changed = match &latest {
            Some(entry) => entry.price != canonical_price,
            None => normalized.price != Some(canonical_price),
        };

        if price_changed {
            self.storage
                .insert_price_history(PriceHistoryEntry {
                    listing_id: normalized.id,
                    price: canonical_price,
                    observed_at: Utc::now(),
                })
                .await
                .map_err(StageError::from)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_replace_html_prefers_larger_document() {
        let listing = RawListing {
            id: RawListingId::new(),
            source_id: SourceId::new(),
            site_ad_id: "ad-1".into(),
            url: "https://example.test".into(),
            raw_html: Some("x".repeat(100)),
            parsed_map: None,
            first_seen_at: Utc::now(),
            last_seen_at: Utc::now(),
            active: true,
            http_meta: Default::default(),
            parse_errors: None,
        };
        assert!(!listing.should_replace_html(105));
        assert!(listing.should_replace_html(200));
    }
}
