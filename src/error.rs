//! Error types for the support wizard.
//!
//! Field validation failures are deliberately absent here: they are data
//! (`validation::FieldErrors`), never `Err` values of this taxonomy.

use std::time::Duration;

use crate::i18n::MessageKey;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to open storage: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures talking to an external collaborator (country lookup, text
/// generation), classified by response status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Service unavailable (status {status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request failed with status {status}: {message}")]
    Generic { status: u16, message: String },

    #[error("Request failed: {0}")]
    Unknown(String),
}

impl TransportError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            500 => Self::Server(message),
            502..=504 => Self::Unavailable { status, message },
            _ => Self::Generic { status, message },
        }
    }

    /// Classify a reqwest failure that carries no usable response body.
    pub fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return Self::Timeout(timeout);
        }
        match err.status() {
            Some(status) => Self::from_status(status.as_u16(), err.to_string()),
            None => Self::Unknown(err.to_string()),
        }
    }

    /// The localized message shown to the user for this failure.
    pub fn message_key(&self) -> MessageKey {
        match self {
            Self::Unauthorized(_) => MessageKey::ErrorUnauthorized,
            Self::Forbidden(_) => MessageKey::ErrorForbidden,
            Self::NotFound(_) => MessageKey::ErrorNotFound,
            Self::Server(_) => MessageKey::ErrorServer,
            Self::Unavailable { .. } => MessageKey::ErrorServiceUnavailable,
            Self::Timeout(_) => MessageKey::ErrorTimeout,
            Self::Generic { .. } => MessageKey::ErrorGeneric,
            Self::Unknown(_) => MessageKey::ErrorUnknown,
        }
    }
}

/// Wizard flow errors that are not field validation failures.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Unknown field {field} for step {step}")]
    UnknownField { step: String, field: String },

    #[error("No staged suggestion for field {0}")]
    NothingStaged(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(
            TransportError::from_status(401, "x"),
            TransportError::Unauthorized(_)
        ));
        assert!(matches!(
            TransportError::from_status(403, "x"),
            TransportError::Forbidden(_)
        ));
        assert!(matches!(
            TransportError::from_status(404, "x"),
            TransportError::NotFound(_)
        ));
        assert!(matches!(
            TransportError::from_status(500, "x"),
            TransportError::Server(_)
        ));
        for status in [502, 503, 504] {
            assert!(matches!(
                TransportError::from_status(status, "x"),
                TransportError::Unavailable { .. }
            ));
        }
        assert_eq!(
            TransportError::from_status(429, "slow down"),
            TransportError::Generic {
                status: 429,
                message: "slow down".to_string()
            }
        );
    }

    #[test]
    fn message_keys_follow_category() {
        assert_eq!(
            TransportError::from_status(503, "").message_key(),
            MessageKey::ErrorServiceUnavailable
        );
        assert_eq!(
            TransportError::Timeout(Duration::from_secs(30)).message_key(),
            MessageKey::ErrorTimeout
        );
        assert_eq!(
            TransportError::Unknown("dns".into()).message_key(),
            MessageKey::ErrorUnknown
        );
        assert_eq!(
            TransportError::from_status(418, "").message_key(),
            MessageKey::ErrorGeneric
        );
    }
}
