//! Pipeline configuration: parsing and defaults.
//!
//! Per the "no ambient global settings object" design note, a [`PipelineConfig`]
//! is constructed once (typically by `carscout-worker` at startup) and passed
//! explicitly into every component that needs it. There is no lazily-initialized
//! global; re-tuning a threshold means constructing a new `PipelineConfig` and
//! re-handing it to the affected stage workers.

use serde::{Deserialize, Serialize};

/// Scorer decision thresholds and comparables sizing, per spec §6.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Minimum score for an `approved` decision.
    pub approval_score_threshold: f64,
    /// Score floor below which a listing is `rejected` rather than `draft`.
    pub draft_floor: f64,
    /// Minimum discount percentage required for approval.
    pub approval_min_discount_pct: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            approval_score_threshold: 7.5,
            draft_floor: 6.0,
            approval_min_discount_pct: 10.0,
        }
    }
}

/// Comparables Engine sizing and freshness policy, per spec §4.6/§6.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ComparablesConfig {
    /// Minimum sample size for a comparables result to be usable at all.
    pub min_sample: usize,
    /// Sample size at which confidence saturates to 1.0.
    pub full_confidence_sample: usize,
    /// Listings older than this (in days) are excluded from the peer set.
    pub freshness_days: i64,
    /// Cached comparables older than this (in hours) are recomputed.
    pub cache_ttl_hours: i64,
    /// Minimum canonical-currency price for a listing to be eligible as a peer.
    pub min_peer_price: i64,
    /// Year window (±) for peer eligibility.
    pub year_window: i32,
    /// Mileage window, as a fraction (±) for peer eligibility.
    pub mileage_window_pct: f64,
}

impl Default for ComparablesConfig {
    fn default() -> Self {
        Self {
            min_sample: 5,
            full_confidence_sample: 30,
            freshness_days: 180,
            cache_ttl_hours: 24,
            min_peer_price: 500,
            year_window: 2,
            mileage_window_pct: 0.30,
        }
    }
}

/// Retry/backoff policy for internal pipeline stages, per spec §4.8.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum retry attempts before a transient failure is abandoned.
    pub max_attempts: u32,
    /// Base backoff in seconds; doubles per attempt.
    pub base_backoff_seconds: u64,
    /// Soft timeout per stage invocation, in seconds.
    pub soft_timeout_seconds: u64,
    /// Hard kill timeout per stage invocation, in seconds.
    pub hard_timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            base_backoff_seconds: 60,
            soft_timeout_seconds: 270,
            hard_timeout_seconds: 300,
        }
    }
}

/// Monitor periodic-pass configuration, per spec §4.8/§4.9.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Width of the "recent activity" window, in minutes.
    pub window_minutes: i64,
    /// Maximum outbound notifications fired in a single pass.
    pub max_posts_per_run: usize,
    /// Only listings first seen within this many days are considered.
    pub max_listing_age_days: i64,
    /// Mileage ceiling for the monitor's coarse prefilter.
    pub prefilter_max_mileage: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_minutes: 5,
            max_posts_per_run: 3,
            max_listing_age_days: 7,
            prefilter_max_mileage: 1_000_000,
        }
    }
}

/// Deduplicator thresholds, per spec §4.5/§6.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DedupeConfig {
    /// Title-similarity threshold for the trigram tier.
    pub text_similarity_threshold: f64,
    /// Cosine-similarity threshold for the optional embedding tier.
    pub embedding_threshold: f64,
    /// Whether the embedding tier is enabled (embeddings computed upstream).
    pub embedding_enabled: bool,
    /// Price tolerance (±fraction) for the seller-phone tier.
    pub phone_price_tolerance_pct: f64,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            text_similarity_threshold: 0.8,
            embedding_threshold: 0.85,
            embedding_enabled: false,
            phone_price_tolerance_pct: 0.10,
        }
    }
}

/// The rescore-stale periodic job's window, per spec §4.8.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RescoreConfig {
    /// Re-enqueue approved listings whose score is older than this, in hours.
    pub rescore_stale_after_hours: i64,
    /// Only listings whose `NormalizedListing` is younger than this (days) are
    /// eligible for the rescore-stale sweep.
    pub max_listing_age_days: i64,
}

impl Default for RescoreConfig {
    fn default() -> Self {
        Self {
            rescore_stale_after_hours: 24,
            max_listing_age_days: 7,
        }
    }
}

/// Whether the Scorer requires a usable Comparables result before it may
/// approve a listing. Per spec §4.7 step 2, defaults to requiring it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum MarketDataPolicy {
    /// Missing/insufficient comparables reject the listing outright.
    Required,
    /// Missing/insufficient comparables degrade to a low-confidence draft.
    Optional,
}

impl Default for MarketDataPolicy {
    fn default() -> Self {
        MarketDataPolicy::Required
    }
}

/// Root configuration object, constructed once at process startup (typically
/// by `carscout-worker`) from a TOML file, and passed explicitly to every
/// component that needs it.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Scorer thresholds.
    pub scoring: ScoringConfig,
    /// Comparables Engine policy.
    pub comparables: ComparablesConfig,
    /// Internal-stage retry/backoff policy.
    pub retry: RetryConfig,
    /// Monitor periodic-pass policy.
    pub monitor: MonitorConfig,
    /// Deduplicator thresholds.
    pub dedupe: DedupeConfig,
    /// Rescore-stale periodic job policy.
    pub rescore: RescoreConfig,
    /// Whether the Scorer requires usable Comparables to approve.
    pub market_data_policy: MarketDataPolicy,
    /// Region/locale the deployment targets (e.g. "bg"); drives the red-flag
    /// keyword tables and the default canonical currency.
    pub locale: String,
}

impl PipelineConfig {
    /// Parses a `PipelineConfig` from a TOML string. Any field absent from
    /// the document falls back to its documented default.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Reads and parses a `PipelineConfig` from a TOML file on disk.
    pub fn from_toml_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config file {}: {e}", path.display()))?;
        Ok(Self::from_toml_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.scoring.approval_score_threshold, 7.5);
        assert_eq!(cfg.comparables.min_sample, 5);
        assert_eq!(cfg.retry.max_attempts, 6);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let toml = r#"
            [scoring]
            approval_score_threshold = 8.0
        "#;
        let cfg = PipelineConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.scoring.approval_score_threshold, 8.0);
        assert_eq!(cfg.scoring.draft_floor, 6.0);
        assert_eq!(cfg.monitor.max_posts_per_run, 3);
    }
}
