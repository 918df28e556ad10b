//! Transient user-visible notifications (toasts / snackbars).

use serde::Serialize;

use crate::error::TransportError;
use crate::i18n::{Catalog, MessageKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            description: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
            description: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// "Error: <categorized message>" for a failed external call.
    pub fn transport(catalog: &Catalog, err: &TransportError) -> Self {
        Self::error(format!(
            "{}: {}",
            catalog.t(MessageKey::ErrorPrefix),
            catalog.t(err.message_key())
        ))
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.level {
            NotificationLevel::Success => "✅",
            NotificationLevel::Info => "ℹ️ ",
            NotificationLevel::Error => "❌",
        };
        write!(f, "{icon} {}", self.message)?;
        if let Some(ref description) = self.description {
            write!(f, " — {description}")?;
        }
        Ok(())
    }
}
