//! The five weighted scoring components, per spec §4.7 step 4.

use crate::brackets::{Bracket, DiscountThresholds};

/// Price/discount component (0–4 points), piecewise by bracket-relative
/// discount.
pub fn price(discount_pct: f64, thresholds: DiscountThresholds) -> f64 {
    if discount_pct >= thresholds.excellent {
        4.0
    } else if discount_pct >= thresholds.good {
        3.5
    } else if discount_pct >= thresholds.fair {
        2.5
    } else if discount_pct >= 5.0 {
        1.5
    } else if discount_pct >= 0.0 {
        0.5
    } else {
        0.0
    }
}

/// Age component (0–2 points).
pub fn age(age_years: i32) -> f64 {
    match age_years {
        a if a <= 2 => 2.0,
        a if a <= 4 => 1.8,
        a if a <= 6 => 1.5,
        a if a <= 8 => 1.2,
        _ => 0.8,
    }
}

/// Mileage component (0–2 points). Absent mileage scores neutral (1.0); the
/// bracket's `mileage_weight` makes cheap-car mileage count for more.
pub fn mileage(mileage_km: Option<i64>, age_years: i32, bracket: Bracket) -> f64 {
    let Some(m) = mileage_km else {
        return 1.0;
    };
    let expected = (age_years.max(0) as f64) * 15_000.0;
    let ratio = if expected > 0.0 { m as f64 / expected } else { 1.0 };

    let base = if ratio < 0.5 {
        2.0
    } else if ratio < 0.8 {
        1.7
    } else if ratio < 1.2 {
        1.3
    } else if ratio < 1.5 {
        0.8
    } else {
        0.3
    };

    (base * (bracket.mileage_weight() / 2.0)).min(2.0)
}

/// Market-confidence component (0–1 points), a step function on the
/// comparables sample size.
pub fn confidence(sample_size: usize) -> f64 {
    match sample_size {
        n if n >= 30 => 1.0,
        n if n >= 20 => 0.8,
        n if n >= 10 => 0.6,
        n if n >= 5 => 0.4,
        _ => 0.2,
    }
}

/// Inputs to the quality/freshness component.
#[derive(Debug, Clone, Copy)]
pub struct QualityInputs {
    /// Length of the free-text description, in characters.
    pub description_len: usize,
    /// Number of images attached to the listing.
    pub image_count: usize,
    /// Hours since the listing was first seen.
    pub listing_age_hours: f64,
}

/// Quality/freshness component (0–1 points): description length, image
/// count, and how recently the listing was first seen, each tiered.
/// Returns `(total, freshness_contribution)` so the caller can record the
/// freshness slice separately on [`carscout_model::Score::freshness_bonus`].
pub fn quality(inputs: QualityInputs) -> (f64, f64) {
    let description_term = match inputs.description_len {
        n if n > 500 => 0.3,
        n if n > 200 => 0.2,
        n if n > 50 => 0.1,
        _ => 0.0,
    };
    let image_term = match inputs.image_count {
        n if n >= 10 => 0.3,
        n if n >= 5 => 0.2,
        n if n >= 2 => 0.1,
        _ => 0.0,
    };
    let freshness_term = if inputs.listing_age_hours <= 6.0 {
        0.4
    } else if inputs.listing_age_hours <= 24.0 {
        0.2
    } else {
        0.0
    };

    let total = (description_term + image_term + freshness_term).min(1.0);
    (total, freshness_term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_component_hits_every_tier() {
        let t = DiscountThresholds { excellent: 25.0, good: 20.0, fair: 15.0 };
        assert_eq!(price(30.0, t), 4.0);
        assert_eq!(price(22.0, t), 3.5);
        assert_eq!(price(16.0, t), 2.5);
        assert_eq!(price(7.0, t), 1.5);
        assert_eq!(price(2.0, t), 0.5);
        assert_eq!(price(-1.0, t), 0.0);
    }

    #[test]
    fn mileage_weight_favors_budget_bracket() {
        let budget = mileage(Some(60_000), 4, Bracket::Budget);
        let luxury = mileage(Some(60_000), 4, Bracket::Luxury);
        assert!(budget > luxury);
    }

    #[test]
    fn quality_caps_at_one_and_splits_out_freshness() {
        let (total, freshness) = quality(QualityInputs {
            description_len: 600,
            image_count: 12,
            listing_age_hours: 3.0,
        });
        assert_eq!(total, 1.0);
        assert_eq!(freshness, 0.4);
    }

    #[test]
    fn absent_mileage_is_neutral() {
        assert_eq!(mileage(None, 5, Bracket::SweetSpot), 1.0);
    }
}
