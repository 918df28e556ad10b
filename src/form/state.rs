//! The form state tree and its container.
//!
//! `FormStore` is the only place slices are mutated. Every mutation emits a
//! single `StoreEvent`; `reset_all` swaps the whole tree under one write lock
//! so no observer ever sees a partially reset state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::slices::{
    FamilyFinancialInfo, FamilyFinancialInfoPatch, PersonalInfo, PersonalInfoPatch, SliceKind,
    SituationDescription, SituationDescriptionPatch,
};
use crate::error::StorageError;
use crate::store::StateStorage;

/// Storage key holding the whole persisted tree.
pub const ROOT_KEY: &str = "persist:root";

const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// All three slices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub personal_info: PersonalInfo,
    pub family_financial: FamilyFinancialInfo,
    pub situation_description: SituationDescription,
}

/// Filled-in fields of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCompletion {
    pub completed: usize,
    pub total: usize,
}

impl StepCompletion {
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// Progress across the whole application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionStats {
    pub personal: StepCompletion,
    pub family: StepCompletion,
    pub situation: StepCompletion,
    pub overall: StepCompletion,
    /// Overall completion rounded to the nearest percent.
    pub percentage: u8,
}

impl FormState {
    pub fn completion(&self) -> CompletionStats {
        let personal = StepCompletion {
            completed: self.personal_info.filled_count(),
            total: PersonalInfo::FIELDS.len(),
        };
        let family = StepCompletion {
            completed: self.family_financial.filled_count(),
            total: FamilyFinancialInfo::FIELDS.len(),
        };
        let situation = StepCompletion {
            completed: self.situation_description.filled_count(),
            total: SituationDescription::FIELDS.len(),
        };
        let overall = StepCompletion {
            completed: personal.completed + family.completed + situation.completed,
            total: personal.total + family.total + situation.total,
        };
        let percentage = ((overall.completed as f64 / overall.total as f64) * 100.0).round() as u8;

        CompletionStats {
            personal,
            family,
            situation,
            overall,
            percentage,
        }
    }
}

/// On-disk shape of the tree, tagged with a schema version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default = "PersistedState::current_version")]
    pub version: u32,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub family_financial: FamilyFinancialInfo,
    #[serde(default)]
    pub situation_description: SituationDescription,
}

impl PersistedState {
    pub const CURRENT_VERSION: u32 = 1;

    fn current_version() -> u32 {
        Self::CURRENT_VERSION
    }

    pub fn from_state(state: &FormState) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            personal_info: state.personal_info.clone(),
            family_financial: state.family_financial.clone(),
            situation_description: state.situation_description.clone(),
        }
    }

    /// Decode a stored blob. Unreadable blobs and blobs written by a newer
    /// schema yield `None`.
    pub fn decode(value: serde_json::Value) -> Option<FormState> {
        let persisted: PersistedState = match serde_json::from_value(value) {
            Ok(p) => p,
            Err(e) => {
                warn!("Ignoring undecodable persisted state: {}", e);
                return None;
            }
        };
        if persisted.version > Self::CURRENT_VERSION {
            warn!(
                stored = persisted.version,
                supported = Self::CURRENT_VERSION,
                "Ignoring persisted state from a newer schema"
            );
            return None;
        }
        Some(FormState {
            personal_info: persisted.personal_info,
            family_financial: persisted.family_financial,
            situation_description: persisted.situation_description,
        })
    }
}

/// Emitted once per store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Updated(SliceKind),
    /// All slices returned to their initial values in one step.
    Reset,
    /// State replaced from storage at startup.
    Rehydrated,
}

/// Shared container for the form state tree.
pub struct FormStore {
    state: RwLock<FormState>,
    tx: broadcast::Sender<StoreEvent>,
}

impl FormStore {
    pub fn new() -> Arc<Self> {
        Self::with_state(FormState::default())
    }

    pub fn with_state(state: FormState) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            state: RwLock::new(state),
            tx,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    pub async fn snapshot(&self) -> FormState {
        self.state.read().await.clone()
    }

    pub async fn personal_info(&self) -> PersonalInfo {
        self.state.read().await.personal_info.clone()
    }

    pub async fn family_financial(&self) -> FamilyFinancialInfo {
        self.state.read().await.family_financial.clone()
    }

    pub async fn situation_description(&self) -> SituationDescription {
        self.state.read().await.situation_description.clone()
    }

    pub async fn update_personal_info(&self, patch: PersonalInfoPatch) -> PersonalInfo {
        let updated = {
            let mut state = self.state.write().await;
            state.personal_info = state.personal_info.update(patch);
            state.personal_info.clone()
        };
        self.emit(StoreEvent::Updated(SliceKind::PersonalInfo));
        updated
    }

    pub async fn update_family_financial(
        &self,
        patch: FamilyFinancialInfoPatch,
    ) -> FamilyFinancialInfo {
        let updated = {
            let mut state = self.state.write().await;
            state.family_financial = state.family_financial.update(patch);
            state.family_financial.clone()
        };
        self.emit(StoreEvent::Updated(SliceKind::FamilyFinancial));
        updated
    }

    pub async fn update_situation_description(
        &self,
        patch: SituationDescriptionPatch,
    ) -> SituationDescription {
        let updated = {
            let mut state = self.state.write().await;
            state.situation_description = state.situation_description.update(patch);
            state.situation_description.clone()
        };
        self.emit(StoreEvent::Updated(SliceKind::SituationDescription));
        updated
    }

    /// Return every slice to its initial value as one transition.
    pub async fn reset_all(&self) {
        {
            let mut state = self.state.write().await;
            *state = FormState::default();
        }
        info!("All form slices reset");
        self.emit(StoreEvent::Reset);
    }

    /// Replace in-memory defaults with the persisted tree, if one exists.
    ///
    /// Returns whether anything was restored. Storage failures degrade to
    /// the current state.
    pub async fn rehydrate(&self, storage: &dyn StateStorage) -> bool {
        let value = match storage.load(ROOT_KEY).await {
            Ok(Some(v)) => v,
            Ok(None) => return false,
            Err(e) => {
                warn!("Failed to load persisted form state: {}", e);
                return false;
            }
        };
        let Some(restored) = PersistedState::decode(value) else {
            return false;
        };
        {
            let mut state = self.state.write().await;
            *state = restored;
        }
        info!("Form state rehydrated from storage");
        self.emit(StoreEvent::Rehydrated);
        true
    }

    /// Write the current tree to storage.
    pub async fn flush(&self, storage: &dyn StateStorage) -> Result<(), StorageError> {
        let persisted = PersistedState::from_state(&*self.state.read().await);
        let value = serde_json::to_value(&persisted)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        storage.save(ROOT_KEY, &value).await
    }

    fn emit(&self, event: StoreEvent) {
        debug!(?event, "Store event");
        // No subscribers is fine
        let _ = self.tx.send(event);
    }
}

/// Spawn the background task that persists a snapshot after every change.
///
/// The task only holds a weak reference to the store and ends once the
/// store is dropped.
pub fn spawn_persistence_task(
    store: Arc<FormStore>,
    storage: Arc<dyn StateStorage>,
) -> JoinHandle<()> {
    let mut rx = store.subscribe();
    let store = Arc::downgrade(&store);
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(StoreEvent::Rehydrated) => continue,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    let Some(store) = store.upgrade() else {
                        break;
                    };
                    if let Err(e) = store.flush(storage.as_ref()).await {
                        warn!("Failed to persist form state: {}", e);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("Persistence task stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::slices::SituationField;
    use crate::store::LibSqlStorage;

    #[test]
    fn completion_counts_non_empty_fields() {
        let mut state = FormState::default();
        assert_eq!(state.completion().percentage, 0);

        state.personal_info.name = "Omar".into();
        state.family_financial.dependents = "0".into();
        state.situation_description.reason_for_applying = "Lost my job last month".into();

        let stats = state.completion();
        assert_eq!(stats.personal, StepCompletion { completed: 1, total: 10 });
        assert_eq!(stats.family, StepCompletion { completed: 1, total: 5 });
        assert_eq!(stats.situation, StepCompletion { completed: 1, total: 3 });
        assert_eq!(stats.overall, StepCompletion { completed: 3, total: 18 });
        assert_eq!(stats.percentage, 17);
        assert!(!stats.personal.is_complete());
    }

    #[tokio::test]
    async fn updates_emit_one_event_each() {
        let store = FormStore::new();
        let mut rx = store.subscribe();

        store
            .update_situation_description(SituationField::ReasonForApplying.patch("need help"))
            .await;
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::Updated(SliceKind::SituationDescription)
        );
        assert_eq!(
            store.situation_description().await.reason_for_applying,
            "need help"
        );
    }

    #[tokio::test]
    async fn reset_all_is_a_single_event() {
        let store = FormStore::new();
        store
            .update_personal_info(PersonalInfoPatch {
                name: Some("Omar".into()),
                ..Default::default()
            })
            .await;
        store
            .update_family_financial(FamilyFinancialInfoPatch {
                dependents: Some("2".into()),
                ..Default::default()
            })
            .await;

        let mut rx = store.subscribe();
        store.reset_all().await;

        assert_eq!(rx.recv().await.unwrap(), StoreEvent::Reset);
        assert!(rx.try_recv().is_err(), "reset must not emit more events");
        assert_eq!(store.snapshot().await, FormState::default());
    }

    #[tokio::test]
    async fn flush_then_rehydrate_restores_state() {
        let storage = LibSqlStorage::new_memory().await.unwrap();
        let store = FormStore::new();
        store
            .update_personal_info(PersonalInfoPatch {
                email: Some("a@b.ae".into()),
                ..Default::default()
            })
            .await;
        store.flush(&storage).await.unwrap();

        let fresh = FormStore::new();
        assert!(fresh.rehydrate(&storage).await);
        assert_eq!(fresh.personal_info().await.email, "a@b.ae");
    }

    #[tokio::test]
    async fn rehydrate_without_data_keeps_defaults() {
        let storage = LibSqlStorage::new_memory().await.unwrap();
        let store = FormStore::new();
        assert!(!store.rehydrate(&storage).await);
        assert_eq!(store.snapshot().await, FormState::default());
    }

    #[test]
    fn decode_rejects_newer_schema() {
        let value = serde_json::json!({
            "version": PersistedState::CURRENT_VERSION + 1,
            "personalInfo": { "name": "Future" }
        });
        assert!(PersistedState::decode(value).is_none());
    }

    #[test]
    fn decode_accepts_untagged_and_partial_blobs() {
        let value = serde_json::json!({
            "familyFinancial": { "housingStatus": "shared" }
        });
        let state = PersistedState::decode(value).unwrap();
        assert_eq!(state.family_financial.housing_status, "shared");
        assert_eq!(state.personal_info, PersonalInfo::default());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(PersistedState::decode(serde_json::json!("nonsense")).is_none());
    }

    #[tokio::test]
    async fn persistence_task_writes_after_changes() {
        let storage: Arc<dyn StateStorage> = Arc::new(LibSqlStorage::new_memory().await.unwrap());
        let store = FormStore::new();
        let handle = spawn_persistence_task(Arc::clone(&store), Arc::clone(&storage));

        store
            .update_family_financial(FamilyFinancialInfoPatch {
                monthly_income: Some("3000".into()),
                ..Default::default()
            })
            .await;

        let mut saved = None;
        for _ in 0..50 {
            if let Some(v) = storage.load(ROOT_KEY).await.unwrap() {
                saved = Some(v);
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let saved = saved.expect("snapshot persisted");
        assert_eq!(saved["familyFinancial"]["monthlyIncome"], "3000");
        assert_eq!(saved["version"], PersistedState::CURRENT_VERSION);

        handle.abort();
    }

    #[tokio::test]
    async fn persistence_task_stops_when_store_is_dropped() {
        let storage: Arc<dyn StateStorage> = Arc::new(LibSqlStorage::new_memory().await.unwrap());
        let store = FormStore::new();
        let handle = spawn_persistence_task(Arc::clone(&store), storage);

        drop(store);
        tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .expect("task did not stop")
            .unwrap();
    }
}
