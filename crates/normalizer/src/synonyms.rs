//! Locale-aware fuel/gearbox/body synonym tables, per spec §4.4 step 3.
//!
//! Constants mirror the original `FieldNormalizer`'s `FUEL_MAPPINGS` /
//! `GEARBOX_MAPPINGS` / `BODY_MAPPINGS` dictionaries (Bulgarian + English
//! synonyms); unrecognized input normalizes to `None`, never an error.

use carscout_model::{BodyType, FuelType, GearboxType};

/// Maps a raw fuel string (any case/whitespace) to a canonical [`FuelType`].
pub fn normalize_fuel(raw: &str) -> Option<FuelType> {
    match raw.trim().to_lowercase().as_str() {
        "дизел" | "diesel" => Some(FuelType::Diesel),
        "бензин" | "petrol" | "gasoline" => Some(FuelType::Petrol),
        "газ" | "lpg" => Some(FuelType::Lpg),
        "cng" => Some(FuelType::Cng),
        "електро" | "electric" => Some(FuelType::Electric),
        "хибрид" | "hybrid" => Some(FuelType::Hybrid),
        _ => None,
    }
}

/// Maps a raw gearbox string to a canonical [`GearboxType`].
pub fn normalize_gearbox(raw: &str) -> Option<GearboxType> {
    match raw.trim().to_lowercase().as_str() {
        "автоматична" | "automatic" | "auto" => Some(GearboxType::Automatic),
        "ръчна" | "manual" => Some(GearboxType::Manual),
        "полуавтоматична" | "semi-automatic" | "semi_automatic" => {
            Some(GearboxType::SemiAutomatic)
        }
        _ => None,
    }
}

/// Maps a raw body-type string to a canonical [`BodyType`].
pub fn normalize_body(raw: &str) -> Option<BodyType> {
    match raw.trim().to_lowercase().as_str() {
        "седан" | "sedan" => Some(BodyType::Sedan),
        "хечбек" | "hatchback" => Some(BodyType::Hatchback),
        "комби" | "wagon" | "estate" => Some(BodyType::Wagon),
        "джип" | "suv" => Some(BodyType::Suv),
        "кабрио" | "convertible" => Some(BodyType::Convertible),
        "купе" | "coupe" => Some(BodyType::Coupe),
        "ван" | "van" => Some(BodyType::Van),
        "пикап" | "pickup" => Some(BodyType::Pickup),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_bulgarian_and_english_synonyms() {
        assert_eq!(normalize_fuel("Дизел"), Some(FuelType::Diesel));
        assert_eq!(normalize_fuel("DIESEL"), Some(FuelType::Diesel));
        assert_eq!(normalize_gearbox("ръчна"), Some(GearboxType::Manual));
        assert_eq!(normalize_body("джип"), Some(BodyType::Suv));
    }

    #[test]
    fn unknown_input_is_none_not_error() {
        assert_eq!(normalize_fuel("rocket fuel"), None);
        assert_eq!(normalize_gearbox(""), None);
    }
}
