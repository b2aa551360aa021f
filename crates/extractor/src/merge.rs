//! Merge logic for combining an HTML-derived `FieldMap` with a
//! scraping front-end's `parsed_map`, per spec §4.3.

use carscout_model::FieldMap;

/// Picks the richer of two `FieldMap`s by non-null field count, with `html`
/// as the tie-breaker when counts are equal.
pub fn pick_richer(html: Option<FieldMap>, parsed: Option<FieldMap>) -> Option<FieldMap> {
    match (html, parsed) {
        (Some(h), Some(p)) => {
            if p.non_null_count() > h.non_null_count() {
                Some(p)
            } else {
                Some(h)
            }
        }
        (Some(h), None) => Some(h),
        (None, Some(p)) => Some(p),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tie_breaks_to_html() {
        let html = FieldMap {
            brand: Some("Audi".into()),
            ..Default::default()
        };
        let parsed = FieldMap {
            model: Some("A6".into()),
            ..Default::default()
        };
        let winner = pick_richer(Some(html.clone()), Some(parsed)).unwrap();
        assert_eq!(winner.brand, html.brand);
    }

    #[test]
    fn richer_parsed_map_wins() {
        let html = FieldMap {
            brand: Some("Audi".into()),
            ..Default::default()
        };
        let parsed = FieldMap {
            brand: Some("Audi".into()),
            model: Some("A6".into()),
            year: Some(2019),
            ..Default::default()
        };
        let winner = pick_richer(Some(html), Some(parsed.clone())).unwrap();
        assert_eq!(winner.model, parsed.model);
    }
}
