//! Support Wizard — three-step social support application.

pub mod config;
pub mod countries;
pub mod error;
pub mod form;
pub mod i18n;
pub mod notify;
pub mod phone;
pub mod session;
pub mod store;
pub mod suggestions;
pub mod validation;
pub mod wizard;
