//! Canonical currency and FX conversion support.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A currency code as observed on a raw listing, or the region's canonical
/// currency after conversion.
///
/// The `Other` variant preserves whatever ISO-4217-ish code the extractor
/// saw so a rate-table miss is recorded rather than silently discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// The region's local currency (the normalization target).
    Local,
    /// Euro.
    Eur,
    /// US Dollar.
    Usd,
    /// Any other ISO-4217-ish code the extractor produced verbatim.
    Other(String),
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Local => write!(f, "LOCAL"),
            Currency::Eur => write!(f, "EUR"),
            Currency::Usd => write!(f, "USD"),
            Currency::Other(code) => write!(f, "{code}"),
        }
    }
}

impl Currency {
    /// Parses a currency code from an extractor's raw string.
    pub fn parse(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "LOCAL" | "BGN" => Currency::Local,
            "EUR" => Currency::Eur,
            "USD" => Currency::Usd,
            other => Currency::Other(other.to_string()),
        }
    }
}
