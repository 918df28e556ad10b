//! Declarative, language-agnostic field rules.

use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;

use crate::i18n::MessageKey;
use crate::phone;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern"));

static COUNTRY_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}$").expect("static pattern"));

/// Date format of `dateOfBirth`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single check on a field value. Rules name the message they fail with;
/// the text comes from the caller's lookup.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Non-blank after trimming.
    Required(MessageKey),
    /// At least this many characters after trimming.
    MinChars(usize, MessageKey),
    /// A whole number.
    Integer,
    /// A whole number not below the bound.
    Min(i64, MessageKey),
    /// One of the listed spellings.
    OneOf(&'static [&'static str]),
    Email,
    /// UAE mobile number in any accepted variant.
    Phone,
    /// Two-letter ISO 3166 country code.
    CountryCode,
    /// `YYYY-MM-DD`, not after today.
    PastDate,
}

impl Rule {
    /// The message key this rule fails with, or `None` if `value` passes.
    pub fn check(&self, value: &str) -> Option<MessageKey> {
        let value = value.trim();
        let passes = match self {
            Self::Required(_) => !value.is_empty(),
            Self::MinChars(min, _) => value.chars().count() >= *min,
            Self::Integer => value.parse::<i64>().is_ok(),
            Self::Min(min, _) => value.parse::<i64>().is_ok_and(|n| n >= *min),
            Self::OneOf(options) => options.contains(&value),
            Self::Email => EMAIL_PATTERN.is_match(value),
            // Checked on the canonical form, which is what gets stored
            Self::Phone => phone::is_valid(&phone::to_canonical(value)),
            Self::CountryCode => COUNTRY_CODE_PATTERN.is_match(value),
            Self::PastDate => parse_past_date(value).is_some(),
        };
        if passes { None } else { Some(self.message()) }
    }

    fn message(&self) -> MessageKey {
        match self {
            Self::Required(key) | Self::MinChars(_, key) | Self::Min(_, key) => *key,
            Self::Integer => MessageKey::InvalidNumber,
            Self::OneOf(_) => MessageKey::InvalidOption,
            Self::Email => MessageKey::InvalidEmail,
            Self::Phone => MessageKey::InvalidPhone,
            Self::CountryCode => MessageKey::InvalidCountry,
            Self::PastDate => MessageKey::InvalidDate,
        }
    }
}

/// Parse a `YYYY-MM-DD` date that is today or earlier.
pub fn parse_past_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .ok()
        .filter(|date| *date <= Utc::now().date_naive())
}

/// First failing rule for `value`, in declaration order.
pub fn first_failure(value: &str, rules: &[Rule]) -> Option<MessageKey> {
    rules.iter().find_map(|rule| rule.check(value))
}
