//! End-to-end wizard flow against file-backed storage.
//!
//! Drives the controller through all three steps, checks the background
//! persistence task, and restarts from the same database file.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::timeout;

use support_wizard::form::{
    FamilyFinancialInfo, FormState, FormStore, PersonalInfo, ROOT_KEY, SituationDescription,
    spawn_persistence_task,
};
use support_wizard::i18n::{Catalog, Locale};
use support_wizard::store::{LibSqlStorage, StateStorage};
use support_wizard::wizard::{MemoryNavigator, Route, StepOutcome, WizardController, WizardStep};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

fn personal() -> PersonalInfo {
    PersonalInfo {
        name: "Mariam Al Hashimi".into(),
        national_id: "784-1985-5555555-5".into(),
        date_of_birth: "1985-01-20".into(),
        gender: "female".into(),
        address: "Building 3, Al Barsha".into(),
        city: "Dubai".into(),
        state: "Dubai".into(),
        country: "AE".into(),
        phone: "+971 56 673 6236".into(),
        email: "mariam@example.ae".into(),
    }
}

fn family() -> FamilyFinancialInfo {
    FamilyFinancialInfo {
        marital_status: "widowed".into(),
        dependents: "2".into(),
        employment_status: "employed".into(),
        monthly_income: "3500".into(),
        housing_status: "rented".into(),
    }
}

fn situation() -> SituationDescription {
    SituationDescription {
        current_financial_situation: "Income barely covers rent and school fees".into(),
        employment_circumstances: "Part-time cashier, hours were cut in half".into(),
        reason_for_applying: "Support until I find a full-time position".into(),
    }
}

/// Poll storage until the persisted root matches `pred`.
async fn wait_for_persisted(storage: &dyn StateStorage, pred: impl Fn(&Value) -> bool) {
    timeout(TEST_TIMEOUT, async {
        loop {
            if let Ok(Some(value)) = storage.load(ROOT_KEY).await {
                if pred(&value) {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("persisted state never matched");
}

#[tokio::test]
async fn progress_survives_restart_and_submit_clears_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wizard.db");
    let catalog = Catalog::new(Locale::En);

    // First run: complete steps 1 and 2
    {
        let storage: Arc<dyn StateStorage> = Arc::new(LibSqlStorage::new_local(&path).await.unwrap());
        let store = FormStore::new();
        let task = spawn_persistence_task(Arc::clone(&store), Arc::clone(&storage));
        let controller = WizardController::new(
            Arc::clone(&store),
            Arc::new(MemoryNavigator::new(Route::PersonalInfo)),
        );

        assert_eq!(
            controller.submit_personal_info(&personal(), &catalog).await,
            StepOutcome::Advanced(Route::FamilyFinancial)
        );
        assert_eq!(
            controller.submit_family_financial(&family(), &catalog).await,
            StepOutcome::Advanced(Route::SituationDescription)
        );

        wait_for_persisted(storage.as_ref(), |v| {
            v["familyFinancial"]["housingStatus"] == "rented"
        })
        .await;
        let stored = storage.load(ROOT_KEY).await.unwrap().unwrap();
        assert_eq!(stored["version"], 1);
        assert_eq!(stored["personalInfo"]["phone"], "971566736236");
        task.abort();
    }

    // Second run: rehydrate, resume at step 3, submit
    let storage: Arc<dyn StateStorage> = Arc::new(LibSqlStorage::new_local(&path).await.unwrap());
    let store = FormStore::new();
    assert!(store.rehydrate(storage.as_ref()).await);
    assert_eq!(store.family_financial().await.dependents, "2");
    assert_eq!(store.personal_info().await.name, "Mariam Al Hashimi");

    let task = spawn_persistence_task(Arc::clone(&store), Arc::clone(&storage));
    let controller = WizardController::new(
        Arc::clone(&store),
        Arc::new(MemoryNavigator::new(Route::SituationDescription)),
    );
    assert_eq!(controller.current_step(), WizardStep::Step3);

    let outcome = controller.submit_situation(&situation(), &catalog).await;
    assert!(matches!(outcome, StepOutcome::Submitted { route: Route::Home, .. }));
    assert_eq!(store.snapshot().await, FormState::default());
    assert_eq!(controller.current_step(), WizardStep::Step1);

    wait_for_persisted(storage.as_ref(), |v| {
        v["personalInfo"]["name"] == "" && v["situationDescription"]["reasonForApplying"] == ""
    })
    .await;
    task.abort();
}

#[tokio::test]
async fn newer_schema_is_ignored() {
    let storage = LibSqlStorage::new_memory().await.unwrap();
    storage
        .save(
            ROOT_KEY,
            &serde_json::json!({
                "version": 99,
                "personalInfo": { "name": "From the future" }
            }),
        )
        .await
        .unwrap();

    let store = FormStore::new();
    assert!(!store.rehydrate(&storage).await);
    assert_eq!(store.snapshot().await, FormState::default());
}

#[tokio::test]
async fn back_and_forth_keeps_entered_data() {
    let store = FormStore::new();
    let controller = WizardController::new(
        Arc::clone(&store),
        Arc::new(MemoryNavigator::new(Route::Home)),
    );
    let catalog = Catalog::new(Locale::Ar);

    assert_eq!(controller.navigate(Route::Home), Route::PersonalInfo);
    controller.submit_personal_info(&personal(), &catalog).await;

    // Half-filled step 2, then back without validation
    let mut partial = family();
    partial.housing_status.clear();
    store.update_family_financial(partial.clone().into()).await;
    assert_eq!(controller.back(), Some(Route::PersonalInfo));
    assert_eq!(store.family_financial().await, partial);

    controller.navigate(Route::FamilyFinancial);
    let StepOutcome::Rejected(errors) = controller.submit_family_financial(&partial, &catalog).await
    else {
        panic!("expected rejection");
    };
    assert_eq!(errors.len(), 1);
    assert!(errors.contains("housingStatus"));
    assert_eq!(controller.current_route(), Route::FamilyFinancial);
}
