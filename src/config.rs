//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::countries::DEFAULT_COUNTRIES_URL;
use crate::error::ConfigError;
use crate::i18n::Locale;
use crate::suggestions::openai::DEFAULT_MODEL;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// libSQL file holding the persisted form state.
    pub db_path: PathBuf,
    /// Directory for daily log files.
    pub log_dir: PathBuf,
    /// Text-generation credential. Suggestions are disabled without it.
    pub openai_api_key: Option<SecretString>,
    pub model: String,
    /// Starting interface language.
    pub locale: Locale,
    /// Transport timeout for every external call.
    pub http_timeout: Duration,
    pub countries_url: String,
    /// Show error details on the fatal screen.
    pub debug: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/support-wizard.db"),
            log_dir: PathBuf::from("./data/logs"),
            openai_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            locale: Locale::En,
            http_timeout: Duration::from_secs(30),
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
            debug: false,
        }
    }
}

impl WizardConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source. Unset and blank values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(path) = get("SUPPORT_WIZARD_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(dir) = get("SUPPORT_WIZARD_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        config.openai_api_key = get("OPENAI_API_KEY").map(SecretString::from);
        if let Some(model) = get("SUPPORT_WIZARD_MODEL") {
            config.model = model;
        }
        if let Some(tag) = get("SUPPORT_WIZARD_LOCALE") {
            config.locale = Locale::parse(&tag).ok_or_else(|| ConfigError::InvalidValue {
                key: "SUPPORT_WIZARD_LOCALE".to_string(),
                message: format!("unsupported locale '{tag}', expected en or ar"),
            })?;
        }
        if let Some(secs) = get("SUPPORT_WIZARD_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "SUPPORT_WIZARD_HTTP_TIMEOUT_SECS".to_string(),
                    message: format!("'{secs}' is not a positive number of seconds"),
                })?;
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = get("SUPPORT_WIZARD_COUNTRIES_URL") {
            config.countries_url = url;
        }
        if let Some(flag) = get("SUPPORT_WIZARD_DEBUG") {
            config.debug = parse_bool(&flag).ok_or_else(|| ConfigError::InvalidValue {
                key: "SUPPORT_WIZARD_DEBUG".to_string(),
                message: format!("'{flag}' is not a boolean"),
            })?;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
