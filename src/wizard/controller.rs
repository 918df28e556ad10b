//! WizardController — validates the active slice, persists it and moves
//! between steps.

use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use super::state::{Route, WizardStep};
use crate::form::{
    FamilyFinancialInfo, FormStore, PersonalInfo, SituationDescription,
};
use crate::i18n::{Catalog, MessageKey};
use crate::notify::Notification;
use crate::validation::{
    FieldErrors, validate_family_financial, validate_personal_info, validate_situation,
};

/// The routing surface: where the user is, and how to send them elsewhere.
pub trait Navigator: Send + Sync {
    fn current(&self) -> Route;
    fn navigate(&self, route: Route);
}

/// Locations kept by [`MemoryNavigator`]; older entries are dropped.
pub const MAX_HISTORY: usize = 32;

/// In-process navigator that remembers the most recent locations visited.
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    history: RwLock<Vec<Route>>,
}

impl MemoryNavigator {
    pub fn new(start: Route) -> Self {
        Self {
            history: RwLock::new(vec![start]),
        }
    }

    pub fn history(&self) -> Vec<Route> {
        self.history
            .read()
            .map(|h| h.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Navigator for MemoryNavigator {
    fn current(&self) -> Route {
        self.history().last().copied().unwrap_or_default()
    }

    fn navigate(&self, route: Route) {
        let mut history = self
            .history
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        history.push(route);
        if history.len() > MAX_HISTORY {
            let excess = history.len() - MAX_HISTORY;
            history.drain(..excess);
        }
    }
}

/// Result of submitting a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Validated, persisted, and moved to the next step.
    Advanced(Route),
    /// Validation failed; nothing was written and the step is unchanged.
    Rejected(FieldErrors),
    /// Final step accepted: all slices reset and the wizard returned home.
    Submitted {
        notification: Notification,
        route: Route,
    },
}

/// Snapshot of the slice shown on the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepView {
    Idle,
    PersonalInfo(PersonalInfo),
    FamilyFinancial(FamilyFinancialInfo),
    SituationDescription(SituationDescription),
}

/// Orchestrates step order. Holds no step state of its own.
pub struct WizardController {
    store: Arc<FormStore>,
    navigator: Arc<dyn Navigator>,
}

impl WizardController {
    pub fn new(store: Arc<FormStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    pub fn store(&self) -> &Arc<FormStore> {
        &self.store
    }

    pub fn current_route(&self) -> Route {
        self.navigator.current()
    }

    pub fn current_step(&self) -> WizardStep {
        WizardStep::from_route(self.navigator.current())
    }

    /// Go to `route`, following the home redirect. No validation guard:
    /// any step may be opened directly.
    pub fn navigate(&self, route: Route) -> Route {
        self.navigator.navigate(route);
        let landed = route.resolve();
        if landed != route {
            self.navigator.navigate(landed);
        }
        debug!(from = %route, to = %landed, "Navigated");
        landed
    }

    /// Current step together with its slice.
    pub async fn view(&self) -> StepView {
        match self.current_step() {
            WizardStep::Idle => StepView::Idle,
            WizardStep::Step1 => StepView::PersonalInfo(self.store.personal_info().await),
            WizardStep::Step2 => StepView::FamilyFinancial(self.store.family_financial().await),
            WizardStep::Step3 => {
                StepView::SituationDescription(self.store.situation_description().await)
            }
        }
    }

    /// Step 1 → step 2.
    pub async fn submit_personal_info(
        &self,
        record: &PersonalInfo,
        catalog: &Catalog,
    ) -> StepOutcome {
        match validate_personal_info(record, |k| catalog.t(k)) {
            Ok(valid) => {
                self.store
                    .update_personal_info(valid.into_record().into())
                    .await;
                self.advance(WizardStep::Step1)
            }
            Err(errors) => self.reject(WizardStep::Step1, errors),
        }
    }

    /// Step 2 → step 3.
    pub async fn submit_family_financial(
        &self,
        record: &FamilyFinancialInfo,
        catalog: &Catalog,
    ) -> StepOutcome {
        match validate_family_financial(record, |k| catalog.t(k)) {
            Ok(valid) => {
                self.store
                    .update_family_financial(valid.into_record().into())
                    .await;
                self.advance(WizardStep::Step2)
            }
            Err(errors) => self.reject(WizardStep::Step2, errors),
        }
    }

    /// Step 3 → submit: persist, notify, reset every slice in one
    /// transition, return home.
    pub async fn submit_situation(
        &self,
        record: &SituationDescription,
        catalog: &Catalog,
    ) -> StepOutcome {
        let valid = match validate_situation(record, |k| catalog.t(k)) {
            Ok(valid) => valid,
            Err(errors) => return self.reject(WizardStep::Step3, errors),
        };

        self.store
            .update_situation_description(valid.into_record().into())
            .await;
        let notification = Notification::success(catalog.t(MessageKey::DataSubmittedSuccessfully))
            .with_description(catalog.t(MessageKey::FormSubmittedDescription));
        self.store.reset_all().await;
        info!("Application submitted");

        self.navigate(Route::Home);
        StepOutcome::Submitted {
            notification,
            route: Route::Home,
        }
    }

    /// Submit whatever the store holds for the current step. Idle redirects
    /// to step 1 instead.
    pub async fn submit_current(&self, catalog: &Catalog) -> StepOutcome {
        match self.view().await {
            StepView::Idle => StepOutcome::Advanced(self.navigate(Route::Home)),
            StepView::PersonalInfo(record) => self.submit_personal_info(&record, catalog).await,
            StepView::FamilyFinancial(record) => {
                self.submit_family_financial(&record, catalog).await
            }
            StepView::SituationDescription(record) => {
                self.submit_situation(&record, catalog).await
            }
        }
    }

    /// Unvalidated step back. Slice data of the step being left is kept.
    /// Returns `None` where there is nothing to go back to.
    pub fn back(&self) -> Option<Route> {
        let step = self.current_step();
        let previous = step.previous()?;
        info!(from = %step, to = %previous, "Wizard step back");
        Some(self.navigate(previous.route()))
    }

    fn advance(&self, from: WizardStep) -> StepOutcome {
        let to = from.next().unwrap_or(WizardStep::Idle);
        info!(from = %from, to = %to, "Wizard step advanced");
        StepOutcome::Advanced(self.navigate(to.route()))
    }

    fn reject(&self, step: WizardStep, errors: FieldErrors) -> StepOutcome {
        debug!(step = %step, failing = errors.len(), "Step validation failed");
        StepOutcome::Rejected(errors)
    }
}
