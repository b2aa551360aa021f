//! Builds a `DedupeSignature` from a listing's normalized fields.

use carscout_model::{DedupeSignature, FieldMap, NormalizedListing};

const MINHASH_SEEDS: [u64; 8] = [
    0x9E3779B97F4A7C15,
    0xC2B2AE3D27D4EB4F,
    0x165667B19E3779F9,
    0x27D4EB2F165667C5,
    0x85EBCA77C2B2AE63,
    0xFF51AFD7ED558CCD,
    0xC4CEB9FE1A85EC53,
    0x2545F4914F6CDD1D,
);

/// Normalizes free text into lowercase, whitespace-collapsed trigram
/// shingling input, mirroring the form a `pg_trgm`-style comparison expects.
pub fn trigram_source(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn shingles(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    if bytes.len() < 3 {
        return vec![s];
    }
    (0..=bytes.len() - 3)
        .filter_map(|i| s.get(i..i + 3))
        .collect()
}

/// Character-trigram Jaccard similarity between two normalized strings, a
/// Rust-side stand-in for PostgreSQL's `pg_trgm` `similarity()` function.
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let sa: std::collections::HashSet<&str> = shingles(a).into_iter().collect();
    let sb: std::collections::HashSet<&str> = shingles(b).into_iter().collect();
    let intersection = sa.intersection(&sb).count();
    let union = sa.union(&sb).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// MinHash signature over the trigram shingles of `text`, used as a
/// precomputed near-duplicate signal for future indexed lookup (the
/// Deduplicator's tier-3 decision itself uses exact trigram Jaccard over
/// the small in-Source candidate set rather than this estimate).
pub fn minhash(text: &str) -> Vec<u64> {
    let shingle_set = shingles(text);
    MINHASH_SEEDS
        .iter()
        .map(|seed| {
            shingle_set
                .iter()
                .map(|sh| hash_with_seed(sh, *seed))
                .min()
                .unwrap_or(u64::MAX)
        })
        .collect()
}

fn hash_with_seed(s: &str, seed: u64) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    seed.hash(&mut hasher);
    s.hash(&mut hasher);
    hasher.finish()
}

/// Computes a perceptual-style hash of the listing's primary image.
///
/// Mirrors the original implementation's own shortcut for this tier: an
/// equality check on the first image, not true pixel-based perceptual
/// hashing (which would require fetching and decoding image bytes). A
/// collision here means the same image URL was seen twice, which is the
/// common case for a true re-post.
pub fn first_image_phash(image_urls: &[String]) -> Option<u64> {
    image_urls.first().map(|url| hash_with_seed(url, 0))
}

/// Builds the full `DedupeSignature` for a listing from its normalized
/// record and the `FieldMap` its `RawListing` was extracted from.
pub fn build(listing: &NormalizedListing, field_map: &FieldMap) -> DedupeSignature {
    let title_source = trigram_source(listing.title.as_deref().unwrap_or_default());
    let description_source = trigram_source(listing.description.as_deref().unwrap_or_default());
    DedupeSignature {
        listing_id: listing.id,
        title_trigram_source: title_source.clone(),
        title_minhash: minhash(&title_source),
        description_minhash: minhash(&description_source),
        first_image_phash: first_image_phash(&field_map.image_urls),
        text_embedding: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_titles_have_similarity_one() {
        let a = trigram_source("BMW X5 3.0d xDrive");
        assert_eq!(trigram_similarity(&a, &a), 1.0);
    }

    #[test]
    fn unrelated_titles_have_low_similarity() {
        let a = trigram_source("BMW X5 3.0d xDrive");
        let b = trigram_source("Skoda Octavia 1.6 TDI");
        assert!(trigram_similarity(&a, &b) < 0.3);
    }

    #[test]
    fn same_image_url_yields_same_phash() {
        let urls = vec!["https://example.test/1.jpg".to_string()];
        assert_eq!(first_image_phash(&urls), first_image_phash(&urls));
    }

    #[test]
    fn no_images_has_no_phash() {
        assert_eq!(first_image_phash(&[]), None);
    }
}
