//! The `Source` entity: a marketplace listings are captured from.

use crate::ids::SourceId;
use serde::{Deserialize, Serialize};

/// A marketplace. Seeded at setup and rarely mutated thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Surrogate identifier.
    pub id: SourceId,
    /// Stable, human-readable name (e.g. "mobile.bg").
    pub name: String,
    /// Base URL of the marketplace.
    pub base_url: String,
    /// Whether crawlers should currently poll this source.
    pub enabled: bool,
    /// Desired crawl cadence, in seconds.
    pub crawl_cadence_seconds: i64,
}
