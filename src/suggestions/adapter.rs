//! Per-field suggestion staging with request sequencing.

use std::collections::HashMap;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::TextGenerator;
use super::prompts;
use crate::error::WizardError;
use crate::form::{FormStore, SituationField};
use crate::i18n::{Catalog, MessageKey};
use crate::notify::Notification;

/// Edit context of one field.
#[derive(Debug, Default)]
struct Slot {
    /// Bumped on every request, discard and direct edit of the field; a
    /// response is only applied if the sequence it was issued under is
    /// still current.
    seq: u64,
    in_flight: bool,
    staged: Option<String>,
}

/// What happened to a request or regenerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionOutcome {
    /// Text is staged for review. Regenerate also carries a notice.
    Staged {
        text: String,
        notification: Option<Notification>,
    },
    /// A request for this field is already in flight.
    Busy,
    /// The response arrived after the field's edit context changed.
    Superseded,
    /// No request made, or it produced nothing usable.
    Failed(Notification),
}

/// Stages AI text for the situation fields without touching the form
/// until the user accepts it.
pub struct SuggestionAdapter {
    generator: Arc<dyn TextGenerator>,
    api_key: Option<SecretString>,
    store: Arc<FormStore>,
    slots: Mutex<HashMap<SituationField, Slot>>,
}

impl SuggestionAdapter {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        api_key: Option<SecretString>,
        store: Arc<FormStore>,
    ) -> Self {
        Self {
            generator,
            api_key,
            store,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ask for a suggestion for `field`, improving `current` when it holds
    /// text.
    pub async fn request(
        &self,
        field: SituationField,
        current: &str,
        catalog: &Catalog,
    ) -> SuggestionOutcome {
        let prompt = prompts::field_prompt(catalog.locale, field, current);
        self.run(field, prompt, catalog, None).await
    }

    /// Ask again, seeding the "improve" prompt with the staged text.
    pub async fn regenerate(
        &self,
        field: SituationField,
        catalog: &Catalog,
    ) -> Result<SuggestionOutcome, WizardError> {
        let staged = self
            .staged(field)
            .await
            .ok_or_else(|| WizardError::NothingStaged(field.key().to_string()))?;
        let prompt = prompts::regenerate_prompt(catalog.locale, &staged);
        let improved = Notification::success(catalog.t(MessageKey::SuggestionImproved));
        Ok(self.run(field, prompt, catalog, Some(improved)).await)
    }

    /// Commit the staged text into the form and clear the buffer.
    pub async fn accept(
        &self,
        field: SituationField,
        catalog: &Catalog,
    ) -> Result<Notification, WizardError> {
        let text = {
            let mut slots = self.slots.lock().await;
            let slot = slots.entry(field).or_default();
            let text = slot
                .staged
                .take()
                .ok_or_else(|| WizardError::NothingStaged(field.key().to_string()))?;
            slot.seq += 1;
            slot.in_flight = false;
            text
        };
        self.store
            .update_situation_description(field.patch(text))
            .await;
        info!(field = %field, "Suggestion accepted");
        Ok(Notification::success(catalog.t(MessageKey::SuggestionAccepted)))
    }

    /// Replace the staged text with the user's own revision of it.
    /// Does not change the edit context, so a later regenerate improves the
    /// revised text.
    pub async fn edit(
        &self,
        field: SituationField,
        text: impl Into<String>,
    ) -> Result<(), WizardError> {
        let mut slots = self.slots.lock().await;
        let staged = slots
            .get_mut(&field)
            .and_then(|slot| slot.staged.as_mut())
            .ok_or_else(|| WizardError::NothingStaged(field.key().to_string()))?;
        *staged = text.into();
        debug!(field = %field, "Staged suggestion edited");
        Ok(())
    }

    /// Drop the staged text and ignore any response still in flight.
    pub async fn discard(&self, field: SituationField) {
        self.clear(field).await;
        debug!(field = %field, "Suggestion discarded");
    }

    /// The field itself was retyped. Suggestions built from the old text,
    /// staged or still in flight, no longer apply.
    pub async fn invalidate(&self, field: SituationField) {
        self.clear(field).await;
        debug!(field = %field, "Suggestion context invalidated by edit");
    }

    pub async fn staged(&self, field: SituationField) -> Option<String> {
        self.slots
            .lock()
            .await
            .get(&field)
            .and_then(|s| s.staged.clone())
    }

    pub async fn is_in_flight(&self, field: SituationField) -> bool {
        self.slots
            .lock()
            .await
            .get(&field)
            .is_some_and(|s| s.in_flight)
    }

    /// Discard every field's edit context.
    pub async fn reset(&self) {
        let mut slots = self.slots.lock().await;
        for slot in slots.values_mut() {
            slot.seq += 1;
            slot.in_flight = false;
            slot.staged = None;
        }
    }

    async fn clear(&self, field: SituationField) {
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(field).or_default();
        slot.seq += 1;
        slot.in_flight = false;
        slot.staged = None;
    }

    async fn run(
        &self,
        field: SituationField,
        prompt: String,
        catalog: &Catalog,
        on_success: Option<Notification>,
    ) -> SuggestionOutcome {
        let Some(ref api_key) = self.api_key else {
            warn!(field = %field, "Suggestion requested without an API key");
            return SuggestionOutcome::Failed(Notification::error(
                catalog.t(MessageKey::OpenAiKeyNotConfigured),
            ));
        };

        let seq = {
            let mut slots = self.slots.lock().await;
            let slot = slots.entry(field).or_default();
            if slot.in_flight {
                return SuggestionOutcome::Busy;
            }
            slot.seq += 1;
            slot.in_flight = true;
            slot.seq
        };
        debug!(field = %field, seq, "Suggestion request started");

        let result = self.generator.generate(&prompt, api_key).await;

        let mut slots = self.slots.lock().await;
        let slot = slots.entry(field).or_default();
        if slot.seq != seq {
            debug!(field = %field, seq, current = slot.seq, "Dropping superseded suggestion");
            return SuggestionOutcome::Superseded;
        }
        slot.in_flight = false;

        match result {
            Ok(Some(text)) => {
                slot.staged = Some(text.clone());
                info!(field = %field, "Suggestion staged");
                SuggestionOutcome::Staged {
                    text,
                    notification: on_success,
                }
            }
            Ok(None) => SuggestionOutcome::Failed(Notification::error(
                catalog.t(MessageKey::CouldNotGetSuggestion),
            )),
            Err(e) => {
                warn!(field = %field, error = %e, "Suggestion request failed");
                SuggestionOutcome::Failed(Notification::transport(catalog, &e))
            }
        }
    }
}
