//! Turns noisy OCR output into the numeric code shown on the display.
//!
//! Every function here is total: OCR noise degrades to an empty result, it
//! never produces an error.

use crate::domain::model::{NormalizedPlate, PlateCode};

/// Country marker printed on the plate strip, not part of the registration.
pub const COUNTRY_CODE: &str = "IND";

/// Plates at least this long follow the `SS DD LL NNNN` layout.
pub const FULL_PLATE_LEN: usize = 10;

/// Uppercases, keeps ASCII letters and digits only, and drops every "IND".
///
/// Removal is applied to the filtered text, so markers split by punctuation
/// (`I.N.D`) or exposed by an earlier removal (`IINDND`) are dropped too. This
/// makes the function idempotent.
pub fn normalize(raw: &str) -> NormalizedPlate {
    let mut plate = String::with_capacity(raw.len());

    for ch in raw.chars().filter(char::is_ascii_alphanumeric) {
        plate.push(ch.to_ascii_uppercase());
        if plate.ends_with(COUNTRY_CODE) {
            plate.truncate(plate.len() - COUNTRY_CODE.len());
        }
    }

    NormalizedPlate::from_clean(plate)
}

pub fn extract_digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Picks the district digits (positions 2..4) and serial digits (6..10) of a
/// full plate; shorter readings keep all of their digits.
pub fn derive_plate_code(plate: impl AsRef<str>) -> PlateCode {
    let plate = plate.as_ref();
    let chars: Vec<char> = plate.chars().collect();

    let digits: String = if chars.len() >= FULL_PLATE_LEN {
        chars[2..4]
            .iter()
            .chain(&chars[6..10])
            .filter(|c| c.is_ascii_digit())
            .collect()
    } else {
        extract_digits(plate)
    };

    PlateCode::from_digits(digits)
}

pub fn normalize_and_extract(raw: &str) -> PlateCode {
    derive_plate_code(normalize(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOISY_SAMPLES: &[&str] = &[
        "",
        "   ",
        "IND MH 20 EE 7602",
        "ind mh 20 ee 7602",
        "MH-12.AB/1234",
        "I.N.D KA 01 AB 1234",
        "IINDND",
        "MIND 42",
        "|KL 07 BN 9|09|",
        "DL3CAF0001\n",
        "ÄB 12 çd 34",
        "१२३ MH 01",
        "!!!",
        "indINDind",
    ];

    #[test]
    fn test_country_prefix_removed() {
        assert_eq!(normalize("IND MH 20 EE 7602").as_str(), "MH20EE7602");
        assert_eq!(normalize("ind mh 20 ee 7602").as_str(), "MH20EE7602");
    }

    #[test]
    fn test_normalize_drops_symbols_and_whitespace() {
        assert_eq!(normalize("  MH-12.AB/1234 \n").as_str(), "MH12AB1234");
        assert_eq!(normalize("!!!").as_str(), "");
        assert_eq!(normalize("").as_str(), "");
    }

    #[test]
    fn test_normalize_removes_nested_markers() {
        assert_eq!(normalize("IINDND").as_str(), "");
        assert_eq!(normalize("I.N.D KA 01").as_str(), "KA01");
        assert_eq!(normalize("MIND 42").as_str(), "M42");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in NOISY_SAMPLES {
            let once = normalize(raw);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "normalize not idempotent for {:?}", raw);
            assert!(!once.as_str().contains(COUNTRY_CODE));
        }
    }

    #[test]
    fn test_extract_digits_only_digits() {
        assert_eq!(extract_digits("MH20EE7602"), "207602");
        assert_eq!(extract_digits("ABC"), "");
        for raw in NOISY_SAMPLES {
            assert!(extract_digits(raw).chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_derive_plate_code_selection_rule() {
        assert_eq!(derive_plate_code("MH20EE7602").as_str(), "207602");
        // Letters in the selected windows are dropped, not shifted in
        assert_eq!(derive_plate_code("KA0XAB12C4").as_str(), "0124");
        // Digits outside the windows are ignored on full plates
        assert_eq!(derive_plate_code("12345678901").as_str(), "347890");
        assert_eq!(derive_plate_code("AB12").as_str(), "12");
        assert_eq!(derive_plate_code("").as_str(), "");
    }

    #[test]
    fn test_derive_plate_code_matches_slices() {
        for raw in NOISY_SAMPLES {
            let plate = normalize(raw);
            let s = plate.as_str();
            let expected = if s.len() >= FULL_PLATE_LEN {
                extract_digits(&format!("{}{}", &s[2..4], &s[6..10]))
            } else {
                extract_digits(s)
            };
            assert_eq!(derive_plate_code(&plate).as_str(), expected, "for {:?}", raw);
        }
    }

    #[test]
    fn test_full_pipeline() {
        assert_eq!(normalize_and_extract("IND MH 20 EE 7602").as_str(), "207602");
        assert_eq!(normalize_and_extract("AB12").as_str(), "12");
        assert!(normalize_and_extract("NO PLATE").is_empty());
    }
}
