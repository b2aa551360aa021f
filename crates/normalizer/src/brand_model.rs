//! Brand/model canonicalization: exact → alias → fuzzy tiers, per spec §4.4
//! step 2. Grounded on the original `BrandModelNormalizer`'s three-tier
//! lookup and its Jaccard-similarity fallback.

use carscout_model::CanonicalBrandModel;

/// Minimum Jaccard token overlap for the fuzzy tier to accept a match.
pub const FUZZY_THRESHOLD: f64 = 0.8;

/// Result of canonicalizing a raw brand/model pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonicalized {
    /// Canonical brand name.
    pub brand: String,
    /// Canonical model name.
    pub model: String,
    /// Which tier produced the match.
    pub tier: MatchTier,
}

/// Which lookup tier resolved a brand/model pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Raw input matched a canonical brand/model exactly (case-insensitive).
    Exact,
    /// Raw input matched one of a canonical entry's recorded aliases.
    Alias,
    /// No exact or alias match; a fuzzy token-overlap match was accepted.
    Fuzzy,
}

/// An in-process cache of active canonical brand/model rows, refreshed at
/// stage-worker startup per spec §5. Mirrors the original's
/// `load_brand_model_cache()` pattern.
#[derive(Debug, Clone, Default)]
pub struct BrandModelCache {
    entries: Vec<CanonicalBrandModel>,
}

impl BrandModelCache {
    /// Builds a cache from the active rows loaded from storage.
    pub fn new(entries: Vec<CanonicalBrandModel>) -> Self {
        Self { entries }
    }

    /// Attempts to canonicalize `raw_brand`/`raw_model` against the cache,
    /// trying exact match, then alias match, then fuzzy token overlap.
    ///
    /// Returns `None` if nothing clears the fuzzy threshold; callers should
    /// fall back to passing the raw strings through untouched (the original
    /// brand/model are still retained on `NormalizedListing`).
    pub fn canonicalize(&self, raw_brand: &str, raw_model: &str) -> Option<Canonicalized> {
        let brand_key = raw_brand.trim().to_lowercase();
        let model_key = raw_model.trim().to_lowercase();

        for entry in &self.entries {
            if !entry.active {
                continue;
            }
            if entry.brand.to_lowercase() == brand_key && entry.model.to_lowercase() == model_key
            {
                return Some(Canonicalized {
                    brand: entry.canonical_brand.clone(),
                    model: entry.canonical_model.clone(),
                    tier: MatchTier::Exact,
                });
            }
        }

        for entry in &self.entries {
            if !entry.active {
                continue;
            }
            if entry
                .aliases
                .iter()
                .any(|a| a.to_lowercase() == format!("{brand_key} {model_key}"))
            {
                return Some(Canonicalized {
                    brand: entry.canonical_brand.clone(),
                    model: entry.canonical_model.clone(),
                    tier: MatchTier::Alias,
                });
            }
        }

        let input_tokens = token_set(&format!("{raw_brand} {raw_model}"));
        let mut best: Option<(&CanonicalBrandModel, f64)> = None;
        for entry in &self.entries {
            if !entry.active {
                continue;
            }
            let entry_tokens =
                token_set(&format!("{} {}", entry.canonical_brand, entry.canonical_model));
            let score = jaccard(&input_tokens, &entry_tokens);
            if score >= FUZZY_THRESHOLD && best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((entry, score));
            }
        }
        best.map(|(entry, _)| Canonicalized {
            brand: entry.canonical_brand.clone(),
            model: entry.canonical_model.clone(),
            tier: MatchTier::Fuzzy,
        })
    }
}

fn token_set(s: &str) -> std::collections::HashSet<String> {
    s.to_lowercase()
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

fn jaccard(a: &std::collections::HashSet<String>, b: &std::collections::HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bmw_3_series() -> CanonicalBrandModel {
        CanonicalBrandModel {
            brand: "BMW".into(),
            model: "3 Series".into(),
            locale: "en".into(),
            canonical_brand: "BMW".into(),
            canonical_model: "3-series".into(),
            aliases: vec!["bmw 3er".into(), "бмв 3 серия".into()],
            active: true,
        }
    }

    #[test]
    fn exact_match_wins() {
        let cache = BrandModelCache::new(vec![bmw_3_series()]);
        let got = cache.canonicalize("BMW", "3 Series").unwrap();
        assert_eq!(got.tier, MatchTier::Exact);
        assert_eq!(got.brand, "BMW");
    }

    #[test]
    fn alias_match_is_recognized() {
        let cache = BrandModelCache::new(vec![bmw_3_series()]);
        let got = cache.canonicalize("bmw", "3er").unwrap();
        assert_eq!(got.tier, MatchTier::Alias);
    }

    #[test]
    fn inactive_entries_are_skipped() {
        let mut entry = bmw_3_series();
        entry.active = false;
        let cache = BrandModelCache::new(vec![entry]);
        assert!(cache.canonicalize("BMW", "3 Series").is_none());
    }

    #[test]
    fn unrelated_input_has_no_fuzzy_match() {
        let cache = BrandModelCache::new(vec![bmw_3_series()]);
        assert!(cache.canonicalize("Toyota", "Corolla").is_none());
    }
}
