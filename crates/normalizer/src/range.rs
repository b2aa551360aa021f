//! Range validation for year/mileage, per spec §4.4 step 4.

use chrono::Datelike;

const MIN_YEAR: i32 = 1900;
const MAX_MILEAGE_KM: i64 = 1_000_000;

/// Validates a manufacture year against `1900..=current_year + 1`. Out of
/// range drops the value to `None` rather than failing the pipeline.
pub fn validate_year(year: Option<i32>, now: chrono::DateTime<chrono::Utc>) -> Option<i32> {
    let max_year = now.year() + 1;
    year.filter(|y| (MIN_YEAR..=max_year).contains(y))
}

/// Validates an odometer reading against `0..=1_000_000` km.
pub fn validate_mileage(mileage: Option<i64>) -> Option<i64> {
    mileage.filter(|m| (0..=MAX_MILEAGE_KM).contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc.with_ymd_and_hms(2026, 7, 28, 0, 0, 0).unwrap()
    }

    #[test]
    fn year_out_of_range_drops_to_none() {
        assert_eq!(validate_year(Some(1899), now()), None);
        assert_eq!(validate_year(Some(2028), now()), None);
        assert_eq!(validate_year(Some(2020), now()), Some(2020));
    }

    #[test]
    fn mileage_out_of_range_drops_to_none() {
        assert_eq!(validate_mileage(Some(-1)), None);
        assert_eq!(validate_mileage(Some(1_000_001)), None);
        assert_eq!(validate_mileage(Some(50_000)), Some(50_000));
    }
}
