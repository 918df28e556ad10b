//! Step routing and the controller that drives it.

pub mod controller;
pub mod state;

pub use controller::{MemoryNavigator, Navigator, StepOutcome, StepView, WizardController};
pub use state::{Route, WizardStep};
