//! FX conversion to the region's local currency, per spec §4.4 step 4.
//!
//! Default rates mirror the original normalizer's fixed table (local
//! currency pegged at 1.0, EUR 1.96, USD 1.80); callers may override via
//! [`FxRates`] for a different deployment region.

use carscout_model::Currency;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A small, in-process FX rate table: units of local currency per one unit
/// of the given currency.
#[derive(Debug, Clone)]
pub struct FxRates {
    eur: Decimal,
    usd: Decimal,
}

impl Default for FxRates {
    fn default() -> Self {
        Self {
            eur: dec!(1.96),
            usd: dec!(1.80),
        }
    }
}

impl FxRates {
    /// Builds a custom rate table.
    pub fn new(eur: Decimal, usd: Decimal) -> Self {
        Self { eur, usd }
    }

    /// Converts `amount` denominated in `from` to the local currency.
    ///
    /// `Currency::Other` codes have no known rate and convert to `None`
    /// rather than silently defaulting to 1:1.
    pub fn to_local(&self, amount: Decimal, from: &Currency) -> Option<Decimal> {
        match from {
            Currency::Local => Some(amount),
            Currency::Eur => Some(amount * self.eur),
            Currency::Usd => Some(amount * self.usd),
            Currency::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_currency_passes_through() {
        let rates = FxRates::default();
        assert_eq!(rates.to_local(dec!(100), &Currency::Local), Some(dec!(100)));
    }

    #[test]
    fn eur_converts_at_default_rate() {
        let rates = FxRates::default();
        assert_eq!(
            rates.to_local(dec!(100), &Currency::Eur),
            Some(dec!(196.00))
        );
    }

    #[test]
    fn unknown_currency_has_no_rate() {
        let rates = FxRates::default();
        assert_eq!(
            rates.to_local(dec!(100), &Currency::Other("JPY".into())),
            None
        );
    }
}
