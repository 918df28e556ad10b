//! Country lookup for the nationality picker.
//!
//! The full list comes from restcountries.com and is cached after the first
//! success. Any failure falls back to a short built-in list, which is never
//! cached so the next lookup tries the network again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::i18n::Locale;

pub const DEFAULT_COUNTRIES_URL: &str =
    "https://restcountries.com/v3.1/all?fields=name,cca2,flag,flags,translations";

/// One selectable country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryOption {
    /// ISO 3166-1 alpha-2.
    pub code: String,
    pub name: String,
    pub name_ar: String,
    /// Emoji flag.
    pub flag: String,
    /// Flag image, empty for built-in entries.
    pub flag_url: String,
}

impl CountryOption {
    pub fn display_name(&self, locale: Locale) -> &str {
        match locale {
            Locale::Ar if !self.name_ar.is_empty() => &self.name_ar,
            _ => &self.name,
        }
    }
}

/// Source of the full country list.
#[async_trait]
pub trait CountryProvider: Send + Sync {
    async fn fetch(&self) -> Result<Vec<CountryOption>, TransportError>;
}

#[derive(Deserialize)]
struct RawCountry {
    name: RawName,
    cca2: String,
    #[serde(default)]
    flag: String,
    #[serde(default)]
    flags: RawFlags,
    #[serde(default)]
    translations: RawTranslations,
}

#[derive(Deserialize)]
struct RawName {
    common: String,
}

#[derive(Deserialize, Default)]
struct RawFlags {
    png: Option<String>,
    svg: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawTranslations {
    ara: Option<RawName>,
}

impl From<RawCountry> for CountryOption {
    fn from(raw: RawCountry) -> Self {
        let name_ar = raw
            .translations
            .ara
            .map(|n| n.common)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| raw.name.common.clone());
        let flag_url = raw
            .flags
            .svg
            .filter(|u| !u.is_empty())
            .or(raw.flags.png)
            .unwrap_or_default();
        Self {
            code: raw.cca2,
            name: raw.name.common,
            name_ar,
            flag: raw.flag,
            flag_url,
        }
    }
}

/// HTTP client for the restcountries v3.1 API.
pub struct RestCountriesClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl RestCountriesClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unknown(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }
}

#[async_trait]
impl CountryProvider for RestCountriesClient {
    async fn fetch(&self) -> Result<Vec<CountryOption>, TransportError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("request failed");
            return Err(TransportError::from_status(status.as_u16(), reason));
        }

        let raw: Vec<RawCountry> = response
            .json()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, self.timeout))?;
        let mut countries: Vec<CountryOption> = raw.into_iter().map(Into::into).collect();
        countries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = countries.len(), "Fetched country list");
        Ok(countries)
    }
}

/// Cached country list with built-in fallback.
pub struct CountryDirectory {
    provider: Arc<dyn CountryProvider>,
    cache: RwLock<Option<Vec<CountryOption>>>,
}

impl CountryDirectory {
    pub fn new(provider: Arc<dyn CountryProvider>) -> Self {
        Self {
            provider,
            cache: RwLock::new(None),
        }
    }

    /// The full list. Never fails.
    pub async fn countries(&self) -> Vec<CountryOption> {
        if let Some(ref cached) = *self.cache.read().await {
            return cached.clone();
        }

        match self.provider.fetch().await {
            Ok(countries) => {
                info!(count = countries.len(), "Country list cached");
                *self.cache.write().await = Some(countries.clone());
                countries
            }
            Err(e) => {
                warn!(error = %e, "Country lookup failed, using built-in list");
                fallback_countries()
            }
        }
    }

    pub async fn is_cached(&self) -> bool {
        self.cache.read().await.is_some()
    }

    /// Look a country up by code, case-insensitively.
    pub async fn find(&self, code: &str) -> Option<CountryOption> {
        self.countries()
            .await
            .into_iter()
            .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
    }
}

/// Filter `countries` by a free-text query.
///
/// Blank queries match everything. Otherwise a country matches when the
/// query appears, case-insensitively, in its name for `locale`, its code, or
/// its English name.
pub fn search<'a>(
    countries: &'a [CountryOption],
    query: &str,
    locale: Locale,
) -> Vec<&'a CountryOption> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return countries.iter().collect();
    }
    countries
        .iter()
        .filter(|c| {
            c.display_name(locale).to_lowercase().contains(&query)
                || c.code.to_lowercase().contains(&query)
                || c.name.to_lowercase().contains(&query)
        })
        .collect()
}

const FALLBACK: &[(&str, &str, &str, &str)] = &[
    ("AE", "United Arab Emirates", "الإمارات العربية المتحدة", "🇦🇪"),
    ("SA", "Saudi Arabia", "المملكة العربية السعودية", "🇸🇦"),
    ("QA", "Qatar", "قطر", "🇶🇦"),
    ("KW", "Kuwait", "الكويت", "🇰🇼"),
    ("OM", "Oman", "عمان", "🇴🇲"),
    ("BH", "Bahrain", "البحرين", "🇧🇭"),
    ("JO", "Jordan", "الأردن", "🇯🇴"),
    ("LB", "Lebanon", "لبنان", "🇱🇧"),
    ("EG", "Egypt", "مصر", "🇪🇬"),
    ("SY", "Syria", "سوريا", "🇸🇾"),
    ("IQ", "Iraq", "العراق", "🇮🇶"),
    ("YE", "Yemen", "اليمن", "🇾🇪"),
    ("PS", "Palestine", "فلسطين", "🇵🇸"),
    ("MA", "Morocco", "المغرب", "🇲🇦"),
    ("TN", "Tunisia", "تونس", "🇹🇳"),
    ("DZ", "Algeria", "الجزائر", "🇩🇿"),
    ("LY", "Libya", "ليبيا", "🇱🇾"),
    ("SD", "Sudan", "السودان", "🇸🇩"),
    ("US", "United States", "الولايات المتحدة", "🇺🇸"),
    ("GB", "United Kingdom", "المملكة المتحدة", "🇬🇧"),
    ("CA", "Canada", "كندا", "🇨🇦"),
    ("AU", "Australia", "أستراليا", "🇦🇺"),
    ("IN", "India", "الهند", "🇮🇳"),
    ("PK", "Pakistan", "باكستان", "🇵🇰"),
    ("BD", "Bangladesh", "بنغلاديش", "🇧🇩"),
    ("TR", "Turkey", "تركيا", "🇹🇷"),
    ("IR", "Iran", "إيران", "🇮🇷"),
    ("AF", "Afghanistan", "أفغانستان", "🇦🇫"),
];

/// Regional shortlist used when the lookup service is unreachable.
pub fn fallback_countries() -> Vec<CountryOption> {
    FALLBACK
        .iter()
        .map(|(code, name, name_ar, flag)| CountryOption {
            code: code.to_string(),
            name: name.to_string(),
            name_ar: name_ar.to_string(),
            flag: flag.to_string(),
            flag_url: String::new(),
        })
        .collect()
}
