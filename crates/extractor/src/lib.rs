//! The Extractor: pluggable, per-source `raw_html → FieldMap` conversion.
//!
//! Grounded on `market_data_ingestor`'s [`DataProvider`](https://docs.rs/market_data_ingestor)-style
//! trait: one `#[async_trait]` interface, dynamic dispatch via
//! `Box<dyn Extractor>` for runtime source selection, a dedicated error
//! enum per implementation boundary.

#![deny(missing_docs)]

pub mod errors;
pub mod merge;

use async_trait::async_trait;
use carscout_model::FieldMap;

pub use errors::ExtractError;

/// A pluggable, per-source field extractor. One implementation per
/// marketplace; the Orchestrator selects the right one by `Source::name`.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Parses `raw_html` (fetched from `url`) into a fixed-schema
    /// [`FieldMap`].
    async fn extract(&self, raw_html: &str, url: &str) -> Result<FieldMap, ExtractError>;
}

/// An extractor that does no HTML parsing at all: it exists to let the
/// Normalizer's field-selection logic (§4.3's "richer map wins") be
/// exercised even when a source only ever supplies a `parsed_map` from the
/// scraping front-end. Also useful as a test double.
pub struct PassthroughExtractor;

#[async_trait]
impl Extractor for PassthroughExtractor {
    async fn extract(&self, _raw_html: &str, _url: &str) -> Result<FieldMap, ExtractError> {
        Ok(FieldMap::default())
    }
}
