//! The `Comparables` entity: a cached pricing analysis per listing.

use crate::ids::NormalizedListingId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse market-position label derived from the subject price's rank
/// among its peer sample's percentiles, surfaced by the Scorer as an extra
/// reason string. Not part of spec.md's data model; recovered from the
/// original price-model's bracket labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPosition {
    /// Substantially below the comparables median.
    VeryCheap,
    /// Moderately below the comparables median.
    Cheap,
    /// Close to the comparables median.
    Average,
    /// Above the comparables median.
    Expensive,
}

impl MarketPosition {
    /// Derives a label from the subject price's rank against the sample's
    /// own percentile boundaries, matching the original price model's
    /// `_analyze_market_position`: bottom 10% is `very_cheap`, bottom 25%
    /// is `cheap`, the middle 50% is `average`, and the top 25% is
    /// `expensive`.
    pub fn from_price_percentiles(price: f64, p10: f64, p25: f64, p75: f64) -> Self {
        if price < p10 {
            MarketPosition::VeryCheap
        } else if price < p25 {
            MarketPosition::Cheap
        } else if price < p75 {
            MarketPosition::Average
        } else {
            MarketPosition::Expensive
        }
    }
}

/// A cached pricing analysis for one [`crate::NormalizedListing`], computed
/// from its peer set by the Comparables Engine.
///
/// Invariant: if present, the sample it was computed from is no older than
/// the configured freshness horizon (see `carscout-comparables`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparables {
    /// The listing this analysis describes.
    pub listing_id: NormalizedListingId,
    /// Number of peer listings in the sample.
    pub sample_size: usize,
    /// Arithmetic mean price across the sample.
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// 10th percentile price.
    pub p10: f64,
    /// 25th percentile price.
    pub p25: f64,
    /// Median price.
    pub p50: f64,
    /// 75th percentile price.
    pub p75: f64,
    /// 90th percentile price.
    pub p90: f64,
    /// `(p50 − listing.price) / p50 × 100`. Positive means the listing is
    /// priced below the sample median.
    pub discount_pct: f64,
    /// Coarse market-position label derived from the subject price's
    /// percentile rank within the sample (see `MarketPosition::from_price_percentiles`).
    pub market_position: MarketPosition,
    /// Confidence in `[0, 1]`, combining sample size and dispersion.
    pub confidence: f64,
    /// Feature vector used to select/weight the peer sample (e.g.
    /// `[year, mileage]` deltas), kept for explainability.
    pub feature_vector: Vec<f64>,
    /// Identifier of the comparables model/algorithm version used.
    pub model_version: String,
    /// When this analysis was computed.
    pub computed_at: DateTime<Utc>,
}

impl Comparables {
    /// Whether this cached analysis is still fresh given a TTL in hours and
    /// whether the subject's price has changed since caching.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl_hours: i64, price_changed: bool) -> bool {
        if price_changed {
            return false;
        }
        now.signed_duration_since(self.computed_at).num_hours() < ttl_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_p10_is_very_cheap() {
        assert_eq!(
            MarketPosition::from_price_percentiles(8_000.0, 9_000.0, 11_000.0, 16_000.0),
            MarketPosition::VeryCheap
        );
    }

    #[test]
    fn between_p10_and_p25_is_cheap() {
        assert_eq!(
            MarketPosition::from_price_percentiles(10_000.0, 9_000.0, 11_000.0, 16_000.0),
            MarketPosition::Cheap
        );
    }

    #[test]
    fn between_p25_and_p75_is_average() {
        assert_eq!(
            MarketPosition::from_price_percentiles(13_000.0, 9_000.0, 11_000.0, 16_000.0),
            MarketPosition::Average
        );
    }

    #[test]
    fn at_or_above_p75_is_expensive() {
        assert_eq!(
            MarketPosition::from_price_percentiles(16_000.0, 9_000.0, 11_000.0, 16_000.0),
            MarketPosition::Expensive
        );
        assert_eq!(
            MarketPosition::from_price_percentiles(20_000.0, 9_000.0, 11_000.0, 16_000.0),
            MarketPosition::Expensive
        );
    }

    #[test]
    fn boundary_values_fall_into_the_higher_band() {
        assert_eq!(
            MarketPosition::from_price_percentiles(9_000.0, 9_000.0, 11_000.0, 16_000.0),
            MarketPosition::Cheap
        );
        assert_eq!(
            MarketPosition::from_price_percentiles(11_000.0, 9_000.0, 11_000.0, 16_000.0),
            MarketPosition::Average
        );
    }
}
