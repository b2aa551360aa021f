//! Red-flag keyword families, per spec §4.7 step 1.
//!
//! Each family is independently triggerable and locale-keyed: the keyword
//! tables to match against are chosen by [`PipelineConfig::locale`][pc],
//! not hard-coded, so a deployment targeting a different market gets its
//! own vocabulary without code changes elsewhere. Only a `bg` table ships
//! today; unrecognized locales fall back to it. `detect` returns every
//! flag that fires; the caller treats the first one as the blocking
//! reason when rejecting.
//!
//! [pc]: carscout_shared::config::PipelineConfig::locale

use carscout_model::{FieldMap, NormalizedListing};
use chrono::{DateTime, Datelike, Utc};

/// A locale's full set of red-flag keyword families.
struct KeywordTables {
    leasing: &'static [&'static str],
    right_hand_drive: &'static [&'static str],
    not_yet_imported: &'static [&'static str],
    accident_salvage: &'static [&'static str],
    urgency: &'static [&'static str],
    premium_brands: &'static [&'static str],
}

const BG_TABLES: KeywordTables = KeywordTables {
    leasing: &[
        "лизинг",
        "лиз.",
        "leasing",
        "месечна вноска",
        "първоначална вноска",
        "авансово",
        "на вноски",
        "кредит",
        "финансиране",
    ],
    right_hand_drive: &[
        "десен волан",
        "дясна кормилница",
        "right hand",
        "rhd",
        "английски",
        "от англия",
        "japanese",
        "от япония",
    ],
    not_yet_imported: &[
        "внос",
        "увоз",
        "германия",
        "deutschland",
        "франция",
        "италия",
        "холандия",
        "нидерландия",
        "czech",
        "чехия",
        "от чужбина",
        "на път",
        "идва",
        "очаква се",
    ],
    accident_salvage: &[
        "катастрофирал",
        "удряна",
        "ударен",
        "счупен",
        "повредена",
        "за части",
        "за ремонт",
        "без документи",
        "без регистрация",
    ],
    urgency: &[
        "спешно",
        "бърза продажба",
        "навлизам",
        "напускам държавата",
        "не отговарям на смс",
        "само обаждане",
        "последна цена",
    ],
    premium_brands: &["bmw", "mercedes", "audi", "lexus"],
};

/// English-only subset of the same families, for deployments outside the
/// Bulgarian-language market where the local-language keywords in
/// [`BG_TABLES`] would never match.
const EN_TABLES: KeywordTables = KeywordTables {
    leasing: &["leasing", "monthly payment", "down payment", "financing", "on credit"],
    right_hand_drive: &["right hand", "rhd", "imported from japan", "imported from uk"],
    not_yet_imported: &["in transit", "arriving soon", "import pending", "expected to arrive"],
    accident_salvage: &["salvage", "crashed", "wrecked", "for parts", "no title"],
    urgency: &["urgent sale", "must sell", "moving abroad", "final price", "no time wasters"],
    premium_brands: &["bmw", "mercedes", "audi", "lexus"],
};

/// Resolves the keyword tables for a deployment's configured locale.
/// Unrecognized locales fall back to `bg`; new locales are added here
/// without touching `detect` itself.
fn tables_for_locale(locale: &str) -> &'static KeywordTables {
    match locale {
        "en" => &EN_TABLES,
        _ => &BG_TABLES,
    }
}

/// A fired red flag: a stable identifier for [`carscout_model::Evaluation`]
/// plus a human-readable detail for the Scorer's reason list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedFlag {
    /// Stable identifier, suitable for `Evaluation::red_flags`.
    pub id: &'static str,
    /// Human-readable detail, including the matched keyword where relevant.
    pub detail: String,
}

/// Runs every red-flag family against a listing's title/description, in
/// priority order: leasing, right-hand-drive, not-yet-imported,
/// accident/salvage, urgency. All that fire are returned; none is "the"
/// decider beyond being first. `locale` selects which keyword tables to
/// match against, per [`PipelineConfig::locale`][pc].
///
/// [pc]: carscout_shared::config::PipelineConfig::locale
pub fn detect(
    listing: &NormalizedListing,
    field_map: &FieldMap,
    now: DateTime<Utc>,
    locale: &str,
) -> Vec<RedFlag> {
    let tables = tables_for_locale(locale);
    let title = listing.title.as_deref().unwrap_or_default();
    let description = listing.description.as_deref().unwrap_or_default();
    let combined = format!("{title} {description}").to_lowercase();

    let mut flags = Vec::new();

    if let Some(flag) = detect_leasing(&combined, listing, field_map, now, tables) {
        flags.push(flag);
    }
    if let Some(flag) = detect_keyword_family("right_hand_drive", tables.right_hand_drive, &combined) {
        flags.push(flag);
    }
    if let Some(flag) = detect_keyword_family("not_yet_imported", tables.not_yet_imported, &combined) {
        flags.push(flag);
    }
    if let Some(flag) = detect_keyword_family("accident_salvage", tables.accident_salvage, &combined) {
        flags.push(flag);
    }
    if let Some(flag) = detect_urgency(&combined, tables) {
        flags.push(flag);
    }

    flags
}

fn detect_keyword_family(id: &'static str, keywords: &[&str], combined: &str) -> Option<RedFlag> {
    keywords.iter().find(|kw| combined.contains(*kw)).map(|kw| RedFlag {
        id,
        detail: format!("{id} detected: '{kw}'"),
    })
}

fn detect_leasing(
    combined: &str,
    listing: &NormalizedListing,
    field_map: &FieldMap,
    now: DateTime<Utc>,
    tables: &KeywordTables,
) -> Option<RedFlag> {
    if let Some(kw) = tables.leasing.iter().find(|kw| combined.contains(*kw)) {
        return Some(RedFlag {
            id: "leasing",
            detail: format!("leasing detected: '{kw}'"),
        });
    }

    // Heuristic: a premium brand, near-new, at an implausibly low price is
    // probably a leasing listing in disguise.
    let current_year = now.year();
    let is_near_new = listing.year.is_some_and(|y| y >= current_year - 2);
    let is_cheap = field_map.price.and_then(|p| p.to_string().parse::<f64>().ok()).is_some_and(|p| p < 20_000.0);
    let is_premium_brand = listing
        .brand
        .as_deref()
        .map(str::to_lowercase)
        .is_some_and(|b| tables.premium_brands.contains(&b.as_str()));

    if is_near_new && is_cheap && is_premium_brand {
        return Some(RedFlag {
            id: "leasing",
            detail: "probable leasing: new premium car priced too low".into(),
        });
    }

    None
}

fn detect_urgency(combined: &str, tables: &KeywordTables) -> Option<RedFlag> {
    let count = tables.urgency.iter().filter(|kw| combined.contains(*kw)).count();
    if count >= 2 {
        Some(RedFlag {
            id: "urgency",
            detail: "multiple urgency phrases - possible scam".into(),
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carscout_model::{NormalizedListingId, RawListingId};

    fn listing(title: &str, description: &str, brand: Option<&str>, year: Option<i32>) -> NormalizedListing {
        NormalizedListing {
            id: NormalizedListingId::new(),
            raw_listing_id: RawListingId::new(),
            brand: brand.map(String::from),
            model: None,
            year,
            mileage: None,
            fuel: None,
            gearbox: None,
            body: None,
            price: None,
            region: None,
            title: Some(title.into()),
            description: Some(description.into()),
            description_hash: None,
            version: 0,
            is_duplicate: false,
            canonical_of: None,
            seller_id: None,
            first_seen_at: Utc::now(),
        }
    }

    #[test]
    fn leasing_keyword_fires() {
        let l = listing("VW Golf", "продава се на лизинг, първоначална вноска 2000", None, None);
        let flags = detect(&l, &FieldMap::default(), Utc::now(), "bg");
        assert_eq!(flags[0].id, "leasing");
    }

    #[test]
    fn premium_near_new_cheap_is_probable_leasing() {
        let l = listing("BMW X5", "perfect condition", Some("BMW"), Some(Utc::now().year()));
        let field_map = FieldMap {
            price: Some(rust_decimal::Decimal::new(18000, 0)),
            ..Default::default()
        };
        let flags = detect(&l, &field_map, Utc::now(), "bg");
        assert_eq!(flags[0].id, "leasing");
    }

    #[test]
    fn urgency_requires_two_phrases() {
        let l = listing("Opel Astra", "спешно продавам", None, None);
        assert!(detect(&l, &FieldMap::default(), Utc::now(), "bg").is_empty());

        let l2 = listing("Opel Astra", "спешно продавам, само обаждане", None, None);
        let flags = detect(&l2, &FieldMap::default(), Utc::now(), "bg");
        assert_eq!(flags[0].id, "urgency");
    }

    #[test]
    fn clean_listing_has_no_flags() {
        let l = listing("Audi A6 2019", "well maintained, full service history", Some("Audi"), Some(2019));
        assert!(detect(&l, &FieldMap::default(), Utc::now(), "bg").is_empty());
    }

    #[test]
    fn en_locale_matches_english_keywords_bg_locale_does_not() {
        let l = listing("Ford Focus", "urgent sale, must sell, moving abroad", None, None);
        assert!(detect(&l, &FieldMap::default(), Utc::now(), "en")
            .iter()
            .any(|f| f.id == "urgency"));
        assert!(detect(&l, &FieldMap::default(), Utc::now(), "bg").is_empty());
    }

    #[test]
    fn unrecognized_locale_falls_back_to_bg() {
        let l = listing("VW Golf", "продава се на лизинг, първоначална вноска 2000", None, None);
        let flags = detect(&l, &FieldMap::default(), Utc::now(), "fr");
        assert_eq!(flags[0].id, "leasing");
    }
}
