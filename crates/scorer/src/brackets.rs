//! Price brackets and their discount-threshold tables, per spec §4.7 step 3.

/// A contiguous price range governing discount-threshold tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// Below the budget floor; too cheap to trust without other signals.
    TooCheap,
    /// 5k–10k: condition and mileage are critical.
    Budget,
    /// 10k–30k: the bulk of good deals live here.
    SweetSpot,
    /// 30k–60k: newer cars, smaller discounts expected.
    Premium,
    /// 60k–150k: everything matters.
    Luxury,
    /// Above the luxury ceiling.
    TooExpensive,
}

/// Discount-percentage thresholds for "excellent" / "good" / "fair", scoped
/// to one [`Bracket`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountThresholds {
    /// Discount at or above this is "excellent".
    pub excellent: f64,
    /// Discount at or above this (but below `excellent`) is "good".
    pub good: f64,
    /// Discount at or above this (but below `good`) is "fair".
    pub fair: f64,
}

impl Bracket {
    /// Maps a canonical-currency price to its bracket.
    pub fn for_price(price: f64) -> Self {
        if price < 5_000.0 {
            Bracket::TooCheap
        } else if price <= 10_000.0 {
            Bracket::Budget
        } else if price <= 30_000.0 {
            Bracket::SweetSpot
        } else if price <= 60_000.0 {
            Bracket::Premium
        } else if price <= 150_000.0 {
            Bracket::Luxury
        } else {
            Bracket::TooExpensive
        }
    }

    /// The bracket's discount thresholds. `TooCheap`/`TooExpensive` fall
    /// back to a conservative default, mirroring the original's
    /// dict-with-default lookup.
    pub fn discount_thresholds(self) -> DiscountThresholds {
        match self {
            Bracket::Budget => DiscountThresholds { excellent: 20.0, good: 15.0, fair: 10.0 },
            Bracket::SweetSpot => DiscountThresholds { excellent: 25.0, good: 20.0, fair: 15.0 },
            Bracket::Premium => DiscountThresholds { excellent: 15.0, good: 12.0, fair: 8.0 },
            Bracket::Luxury => DiscountThresholds { excellent: 10.0, good: 8.0, fair: 5.0 },
            Bracket::TooCheap | Bracket::TooExpensive => {
                DiscountThresholds { excellent: 15.0, good: 10.0, fair: 5.0 }
            }
        }
    }

    /// Mileage-component weight: mileage matters more on cheap cars, less
    /// on expensive ones.
    pub fn mileage_weight(self) -> f64 {
        match self {
            Bracket::Budget => 2.5,
            Bracket::SweetSpot => 2.0,
            Bracket::Premium => 1.5,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(3_000.0, Bracket::TooCheap)]
    #[case(8_000.0, Bracket::Budget)]
    #[case(20_000.0, Bracket::SweetSpot)]
    #[case(45_000.0, Bracket::Premium)]
    #[case(100_000.0, Bracket::Luxury)]
    #[case(200_000.0, Bracket::TooExpensive)]
    fn price_maps_to_expected_bracket(#[case] price: f64, #[case] expected: Bracket) {
        assert_eq!(Bracket::for_price(price), expected);
    }

    #[rstest]
    #[case(Bracket::Budget, 20.0, 15.0, 10.0)]
    #[case(Bracket::SweetSpot, 25.0, 20.0, 15.0)]
    #[case(Bracket::Premium, 15.0, 12.0, 8.0)]
    #[case(Bracket::Luxury, 10.0, 8.0, 5.0)]
    fn bracket_discount_thresholds_match_table(
        #[case] bracket: Bracket,
        #[case] excellent: f64,
        #[case] good: f64,
        #[case] fair: f64,
    ) {
        let t = bracket.discount_thresholds();
        assert_eq!(t.excellent, excellent);
        assert_eq!(t.good, good);
        assert_eq!(t.fair, fair);
    }
}
