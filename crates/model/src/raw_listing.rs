//! The `RawListing` entity: a captured scraped document.

use crate::field_map::FieldMap;
use crate::ids::{RawListingId, SourceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// HTTP-level metadata captured alongside a raw document, used to decide
/// whether a re-fetch actually changed anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpMeta {
    /// HTTP status code of the fetch that produced this observation.
    pub status: Option<u16>,
    /// `ETag` response header, if the source sent one.
    pub etag: Option<String>,
    /// `Last-Modified` response header, if the source sent one.
    pub last_modified: Option<String>,
}

impl HttpMeta {
    /// Merges a newly-observed `HttpMeta` into this one, preferring the new
    /// values whenever they're present. Mirrors the "merges new http_meta"
    /// clause of the Raw Ingestor's re-observation path.
    pub fn merge(&mut self, newer: HttpMeta) {
        if newer.status.is_some() {
            self.status = newer.status;
        }
        if newer.etag.is_some() {
            self.etag = newer.etag;
        }
        if newer.last_modified.is_some() {
            self.last_modified = newer.last_modified;
        }
    }
}

/// A captured scraped document, owned exclusively by its [`crate::Source`].
///
/// Unique on `(source_id, site_ad_id)`. Never deleted; a listing that stops
/// appearing in a crawl is marked inactive, not removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    /// Surrogate identifier.
    pub id: RawListingId,
    /// Owning marketplace.
    pub source_id: SourceId,
    /// The marketplace's own ad identifier. Unique within `source_id`.
    pub site_ad_id: String,
    /// URL the document was fetched from.
    pub url: String,
    /// Raw HTML blob, or a reference to out-of-band storage. Optional: the
    /// scraping front-end may supply only a `parsed_map`.
    pub raw_html: Option<String>,
    /// Pre-extracted field map supplied by the scraping front-end, when the
    /// spider parses fields itself instead of shipping raw HTML.
    pub parsed_map: Option<FieldMap>,
    /// When this (source, site_ad_id) pair was first observed.
    pub first_seen_at: DateTime<Utc>,
    /// When this pair was most recently observed.
    pub last_seen_at: DateTime<Utc>,
    /// Whether the listing is still present on the marketplace.
    pub active: bool,
    /// HTTP metadata from the most recent fetch.
    pub http_meta: HttpMeta,
    /// Deterministic extraction failure text, if the Extractor could not
    /// produce a `FieldMap` from this document.
    pub parse_errors: Option<String>,
}

impl RawListing {
    /// Whether `raw_html` may be overwritten by a new observation: only
    /// when no HTML is stored yet, or the new blob is non-trivially larger.
    pub fn should_replace_html(&self, candidate_len: usize) -> bool {
        match &self.raw_html {
            None => true,
            Some(existing) => candidate_len > existing.len().saturating_mul(11) / 10,
        }
    }
}
