//! Stable description digest, per spec §4.4 step 6.

use sha2::{Digest, Sha256};

/// Computes a stable hex digest of `description`: whitespace-collapsed and
/// case-folded first, so cosmetic re-scrapes don't change the hash.
pub fn description_hash(description: &str) -> String {
    let normalized = description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    digest_hex(&normalized)
}

/// Computes a stable hex digest of a cleartext phone number, so the
/// `Seller` entity can be keyed without ever persisting the number itself.
pub fn phone_hash(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    digest_hex(&digits)
}

fn digest_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_and_case_do_not_affect_hash() {
        let a = description_hash("Great  car,\nlow mileage");
        let b = description_hash("great car, low mileage");
        assert_eq!(a, b);
    }

    #[test]
    fn different_text_hashes_differently() {
        assert_ne!(description_hash("a"), description_hash("b"));
    }
}
