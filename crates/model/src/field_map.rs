//! `FieldMap`: the Extractor's fixed-schema output.

use crate::currency::Currency;
use serde::{Deserialize, Serialize};

/// The fixed-schema structured output of an Extractor, whether produced by
/// parsing `raw_html` or passed through from a scraping front-end's
/// `parsed_map`.
///
/// Every field is optional individually; the Normalizer enforces the
/// cross-field rule that at least one of `brand`/`model` and a positive
/// `price` must be present before the pipeline proceeds. Fields an
/// extractor doesn't recognize are dropped, never carried as loose data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMap {
    /// Listing title as shown on the marketplace.
    pub title: Option<String>,
    /// Raw brand string, pre-canonicalization (e.g. "BMW").
    pub brand: Option<String>,
    /// Raw model string, pre-canonicalization (e.g. "X5").
    pub model: Option<String>,
    /// Manufacture year, expected in `1900..=current_year + 1`.
    pub year: Option<i32>,
    /// Odometer reading in kilometers, expected in `0..=1_000_000`.
    pub mileage: Option<i64>,
    /// Raw fuel string, pre-canonicalization.
    pub fuel: Option<String>,
    /// Raw gearbox string, pre-canonicalization.
    pub gearbox: Option<String>,
    /// Raw body-type string, pre-canonicalization.
    pub body: Option<String>,
    /// Asking price in `currency`.
    pub price: Option<rust_decimal::Decimal>,
    /// Currency the price is denominated in.
    pub currency: Option<Currency>,
    /// Region/locality string as shown on the marketplace.
    pub region: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Image URLs in marketplace order; the first is the primary image.
    pub image_urls: Vec<String>,
    /// Cleartext seller phone number. Hashed before storage; never
    /// persisted verbatim.
    pub phone: Option<String>,
    /// Engine power in horsepower.
    pub engine_power_hp: Option<i32>,
    /// Engine displacement in cubic centimeters.
    pub engine_volume_cc: Option<i32>,
}

impl FieldMap {
    /// Number of non-null fields, used by the Extractor to pick the richer
    /// of a `raw_html`-derived map and a `parsed_map` when both are present.
    pub fn non_null_count(&self) -> usize {
        let mut n = 0;
        if self.title.is_some() {
            n += 1;
        }
        if self.brand.is_some() {
            n += 1;
        }
        if self.model.is_some() {
            n += 1;
        }
        if self.year.is_some() {
            n += 1;
        }
        if self.mileage.is_some() {
            n += 1;
        }
        if self.fuel.is_some() {
            n += 1;
        }
        if self.gearbox.is_some() {
            n += 1;
        }
        if self.body.is_some() {
            n += 1;
        }
        if self.price.is_some() {
            n += 1;
        }
        if self.currency.is_some() {
            n += 1;
        }
        if self.region.is_some() {
            n += 1;
        }
        if self.description.is_some() {
            n += 1;
        }
        if !self.image_urls.is_empty() {
            n += 1;
        }
        if self.phone.is_some() {
            n += 1;
        }
        if self.engine_power_hp.is_some() {
            n += 1;
        }
        if self.engine_volume_cc.is_some() {
            n += 1;
        }
        n
    }

    /// Whether this map satisfies the minimum the pipeline requires to
    /// proceed past extraction: at least one of brand/model, and a
    /// strictly positive price.
    pub fn is_viable(&self) -> bool {
        let has_identity = self.brand.is_some() || self.model.is_some();
        let has_price = self.price.is_some_and(|p| p > rust_decimal::Decimal::ZERO);
        has_identity && has_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viable_requires_identity_and_positive_price() {
        let mut f = FieldMap::default();
        assert!(!f.is_viable());
        f.brand = Some("Audi".to_string());
        assert!(!f.is_viable());
        f.price = Some(rust_decimal::Decimal::new(0, 0));
        assert!(!f.is_viable());
        f.price = Some(rust_decimal::Decimal::new(22000, 0));
        assert!(f.is_viable());
    }

    #[test]
    fn richer_map_wins_on_non_null_count() {
        let sparse = FieldMap {
            brand: Some("Audi".into()),
            ..Default::default()
        };
        let rich = FieldMap {
            brand: Some("Audi".into()),
            model: Some("A6".into()),
            year: Some(2019),
            ..Default::default()
        };
        assert!(rich.non_null_count() > sparse.non_null_count());
    }
}
