//! Canonical vocabulary: brand/model mapping and closed-set field types.

use serde::{Deserialize, Serialize};

/// Canonicalized fuel type. Unknown raw strings normalize to `None`, never
/// to a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    /// Diesel.
    Diesel,
    /// Petrol/gasoline.
    Petrol,
    /// Liquefied petroleum gas.
    Lpg,
    /// Compressed natural gas.
    Cng,
    /// Battery electric.
    Electric,
    /// Hybrid (any mix of combustion + electric).
    Hybrid,
}

/// Canonicalized gearbox type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GearboxType {
    /// Automatic transmission.
    Automatic,
    /// Manual transmission.
    Manual,
    /// Semi-automatic / dual-clutch without a clutch pedal.
    SemiAutomatic,
}

/// Canonicalized body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    /// Sedan / saloon.
    Sedan,
    /// Hatchback.
    Hatchback,
    /// Estate / station wagon.
    Wagon,
    /// Sport utility vehicle.
    Suv,
    /// Convertible / cabriolet.
    Convertible,
    /// Coupe.
    Coupe,
    /// Van / minivan.
    Van,
    /// Pickup truck.
    Pickup,
}

/// A row of the (brand-string, model-string, locale) → canonical pair
/// lookup table, with an alias list for the second tier of §4.4's matching.
///
/// Read-mostly; refreshed by stage workers at startup per §5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalBrandModel {
    /// Raw brand string as commonly observed (e.g. "BMW").
    pub brand: String,
    /// Raw model string as commonly observed (e.g. "X5").
    pub model: String,
    /// Locale this mapping applies to (e.g. "bg").
    pub locale: String,
    /// Canonical, lowercase brand (e.g. "bmw").
    pub canonical_brand: String,
    /// Canonical, lowercase model (e.g. "x5").
    pub canonical_model: String,
    /// Alternative spellings that should resolve to the same canonical pair.
    pub aliases: Vec<String>,
    /// Whether this mapping is active and should be consulted.
    pub active: bool,
}

impl CanonicalBrandModel {
    /// Space-split, lowercase tokens of the canonical model, used for the
    /// Jaccard fuzzy-match tier.
    pub fn model_tokens(&self) -> Vec<&str> {
        self.canonical_model.split_whitespace().collect()
    }
}
