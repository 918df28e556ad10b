//! Phone normalizer for UAE mobile numbers.
//!
//! Two views of the same number:
//! - display: `56 673 6236`, built progressively while the user types
//! - canonical: `971566736236`, digits only, always carrying the calling code

use std::sync::LazyLock;

use regex::Regex;

/// Calling code prepended to every canonical number.
pub const COUNTRY_CODE: &str = "971";

/// Digits of a local mobile number (mobile prefix included).
pub const LOCAL_DIGITS: usize = 9;

/// Display placeholder / example for the local part.
pub const EXAMPLE: &str = "56 673 6236";

/// Accepted shapes once non-digits are removed: optional `00971`, `971` or
/// trunk `0`, then the mobile prefix `5` and eight more digits.
static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(00971|971|0)?5[0-9]{8}$").expect("static pattern"));

/// Prefix forms stripped by [`format`], longest match first.
const DISPLAY_PREFIXES: [&str; 4] = ["+971", "00971", "971", "0"];

/// Format free-typed input for display.
///
/// Keeps digits and `+`, drops one recognized country-code prefix (`+971`,
/// `00971`, `971`) or a trunk `0`, then groups the local digits as 2-3-4.
/// Partial input yields partial groups; digits past the ninth are dropped.
/// Input that is still an incomplete prefix (`+9`, `009`, `97`) shows
/// nothing yet, so the output never shrinks while typing.
pub fn format(value: &str) -> String {
    let kept: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if DISPLAY_PREFIXES
        .iter()
        .any(|prefix| prefix.len() > kept.len() && prefix.starts_with(kept.as_str()))
    {
        return String::new();
    }

    let local = DISPLAY_PREFIXES
        .iter()
        .find_map(|prefix| kept.strip_prefix(prefix))
        .unwrap_or(&kept);

    let digits: Vec<char> = local
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(LOCAL_DIGITS)
        .collect();

    let group = |range: std::ops::Range<usize>| -> String {
        digits[range.start.min(digits.len())..range.end.min(digits.len())]
            .iter()
            .collect()
    };

    match digits.len() {
        0..=2 => group(0..2),
        3..=5 => format!("{} {}", group(0..2), group(2..5)),
        _ => format!("{} {} {}", group(0..2), group(2..5), group(5..9)),
    }
}

/// Convert any typed variant into canonical storage form.
///
/// Idempotent: the output starts with the calling code followed by a local
/// part without leading zeros, which this function maps to itself.
/// Input without local digits maps to the empty string.
pub fn to_canonical(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();

    let without_code = digits
        .strip_prefix("00971")
        .or_else(|| digits.strip_prefix(COUNTRY_CODE))
        .unwrap_or(&digits);
    let local = without_code.trim_start_matches('0');

    if local.is_empty() {
        return String::new();
    }
    format!("{COUNTRY_CODE}{local}")
}

/// Whether `value` is a UAE mobile number in any accepted variant.
pub fn is_valid(value: &str) -> bool {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    MOBILE_PATTERN.is_match(&digits)
}

/// Local digits of a canonical number, for editing views.
pub fn local_part(canonical: &str) -> &str {
    canonical.strip_prefix(COUNTRY_CODE).unwrap_or(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_local_number() {
        assert_eq!(format("566736236"), "56 673 6236");
    }

    #[test]
    fn formats_every_prefix_variant() {
        for input in [
            "+971566736236",
            "00971566736236",
            "971566736236",
            "0566736236",
            "+971 56 673 6236",
            "(056) 673-6236",
        ] {
            assert_eq!(format(input), "56 673 6236", "input {input:?}");
        }
    }

    #[test]
    fn format_handles_empty_and_partial_input() {
        assert_eq!(format(""), "");
        assert_eq!(format("5"), "5");
        assert_eq!(format("56"), "56");
        assert_eq!(format("566"), "56 6");
        assert_eq!(format("56673"), "56 673");
        assert_eq!(format("566736"), "56 673 6");
        assert_eq!(format("abc"), "");
    }

    #[test]
    fn incomplete_country_code_shows_nothing() {
        for partial in ["+", "+9", "+97", "00", "009", "0097", "9", "97"] {
            assert_eq!(format(partial), "", "input {partial:?}");
        }
        assert_eq!(format("9715"), "5");
        assert_eq!(format("96"), "96");
    }

    #[test]
    fn format_of_canonical_is_display_form() {
        assert_eq!(format(&to_canonical("566736236")), "56 673 6236");
    }

    #[test]
    fn format_length_never_shrinks_while_typing() {
        for typed in [
            "566736236123",
            "0566736236",
            "971566736236",
            "00971566736236",
            "+971566736236",
        ] {
            let mut previous = 0;
            for end in 0..=typed.len() {
                let shown = format(&typed[..end]);
                assert!(
                    shown.len() >= previous,
                    "{:?} shrank to {shown:?}",
                    &typed[..end]
                );
                previous = shown.len();
            }
        }
    }

    #[test]
    fn canonical_from_variants() {
        for input in [
            "566736236",
            "0566736236",
            "971566736236",
            "00971566736236",
            "+971 56 673 6236",
            "9710566736236",
        ] {
            assert_eq!(to_canonical(input), "971566736236", "input {input:?}");
        }
    }

    #[test]
    fn canonical_is_idempotent() {
        for input in [
            "",
            "0",
            "00",
            "971",
            "9710",
            "566736236",
            "0971566",
            "000971123",
            "+971 56 673 6236",
            "a1b2c3",
            "97197197",
        ] {
            let once = to_canonical(input);
            assert_eq!(to_canonical(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn canonical_of_empty_is_empty() {
        assert_eq!(to_canonical(""), "");
        assert_eq!(to_canonical("+"), "");
        assert_eq!(to_canonical("971"), "");
    }

    #[test]
    fn validation_accepts_mobile_numbers() {
        assert!(is_valid("971566736236"));
        assert!(is_valid("566736236"));
        assert!(is_valid("0566736236"));
        assert!(is_valid("00971566736236"));
        assert!(is_valid("+971 56 673 6236"));
    }

    #[test]
    fn validation_rejects_wrong_prefix_or_length() {
        assert!(!is_valid("971466736236"));
        assert!(!is_valid("97156673623"));
        assert!(!is_valid("9715667362361"));
        assert!(!is_valid(""));
        assert!(!is_valid("44566736236"));
    }

    #[test]
    fn local_part_strips_code() {
        assert_eq!(local_part("971566736236"), "566736236");
        assert_eq!(local_part("566736236"), "566736236");
    }
}
