//! Peer selection with progressive filter relaxation, per spec §4.6.

use carscout_model::NormalizedListing;
use carscout_shared::config::ComparablesConfig;

/// Selects the peer sample used for a listing's pricing analysis from an
/// already brand/model/non-duplicate/priced/fresh-filtered candidate pool.
///
/// Applies year and mileage windows unconditionally when the subject has
/// those fields; fuel and gearbox are applied together and dropped as a
/// pair if doing so would starve the sample below `min_sample`.
pub fn select(
    subject: &NormalizedListing,
    candidates: Vec<NormalizedListing>,
    config: &ComparablesConfig,
) -> Vec<NormalizedListing> {
    let windowed: Vec<NormalizedListing> = candidates
        .into_iter()
        .filter(|c| year_in_window(subject, c, config.year_window))
        .filter(|c| mileage_in_window(subject, c, config.mileage_window_pct))
        .collect();

    if subject.fuel.is_none() && subject.gearbox.is_none() {
        return windowed;
    }

    let refined: Vec<NormalizedListing> = windowed
        .iter()
        .filter(|c| fuel_matches(subject, c))
        .filter(|c| gearbox_matches(subject, c))
        .cloned()
        .collect();

    if refined.len() >= config.min_sample {
        refined
    } else {
        windowed
    }
}

fn year_in_window(subject: &NormalizedListing, candidate: &NormalizedListing, window: i32) -> bool {
    match (subject.year, candidate.year) {
        (Some(sy), Some(cy)) => (sy - cy).abs() <= window,
        (Some(_), None) => false,
        (None, _) => true,
    }
}

fn mileage_in_window(
    subject: &NormalizedListing,
    candidate: &NormalizedListing,
    window_pct: f64,
) -> bool {
    match (subject.mileage, candidate.mileage) {
        (Some(sm), Some(cm)) if sm > 0 => {
            let delta = (sm - cm).abs() as f64 / sm as f64;
            delta <= window_pct
        }
        (Some(_), _) => true,
        (None, _) => true,
    }
}

fn fuel_matches(subject: &NormalizedListing, candidate: &NormalizedListing) -> bool {
    match subject.fuel {
        Some(f) => candidate.fuel == Some(f),
        None => true,
    }
}

fn gearbox_matches(subject: &NormalizedListing, candidate: &NormalizedListing) -> bool {
    match subject.gearbox {
        Some(g) => candidate.gearbox == Some(g),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carscout_model::{FuelType, NormalizedListingId, RawListingId};
    use chrono::Utc;

    fn listing(year: Option<i32>, mileage: Option<i64>, fuel: Option<FuelType>) -> NormalizedListing {
        NormalizedListing {
            id: NormalizedListingId::new(),
            raw_listing_id: RawListingId::new(),
            brand: Some("bmw".into()),
            model: Some("x5".into()),
            year,
            mileage,
            fuel,
            gearbox: None,
            body: None,
            price: Some(rust_decimal::Decimal::new(20000, 0)),
            region: None,
            title: None,
            description: None,
            description_hash: None,
            version: 0,
            is_duplicate: false,
            canonical_of: None,
            seller_id: None,
            first_seen_at: Utc::now(),
        }
    }

    #[test]
    fn year_window_excludes_far_years() {
        let subject = listing(Some(2020), None, None);
        let near = listing(Some(2021), None, None);
        let far = listing(Some(2010), None, None);
        let config = ComparablesConfig::default();
        let picked = select(&subject, vec![near.clone(), far], &config);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].year, near.year);
    }

    #[test]
    fn fuel_filter_drops_when_it_would_starve_sample() {
        let subject = listing(Some(2020), None, Some(FuelType::Diesel));
        let candidates = vec![
            listing(Some(2020), None, Some(FuelType::Petrol)),
            listing(Some(2020), None, Some(FuelType::Petrol)),
        ];
        let mut config = ComparablesConfig::default();
        config.min_sample = 2;
        let picked = select(&subject, candidates, &config);
        assert_eq!(picked.len(), 2);
    }
}
