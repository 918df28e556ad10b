//! Form data: the three wizard slices and the store that owns them.

pub mod slices;
pub mod state;

pub use slices::{
    EmploymentStatus, FamilyFinancialInfo, FamilyFinancialInfoPatch, Gender, HousingStatus,
    MaritalStatus, PersonalInfo, PersonalInfoPatch, SituationDescription,
    SituationDescriptionPatch, SituationField, SliceKind,
};
pub use state::{
    CompletionStats, FormState, FormStore, PersistedState, ROOT_KEY, StepCompletion, StoreEvent,
    spawn_persistence_task,
};
