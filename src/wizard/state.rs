//! Wizard state machine — routes and the steps they imply.
//!
//! The step is never stored on its own. It is always `WizardStep::from_route`
//! of the current location, so resuming at a URL resumes at its step.

use serde::{Deserialize, Serialize};

use crate::form::SliceKind;
use crate::i18n::MessageKey;

/// The four logical locations of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Always redirects to step 1.
    #[default]
    Home,
    PersonalInfo,
    FamilyFinancial,
    SituationDescription,
}

impl Route {
    pub const ALL: [Route; 4] = [
        Self::Home,
        Self::PersonalInfo,
        Self::FamilyFinancial,
        Self::SituationDescription,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::PersonalInfo => "/step1",
            Self::FamilyFinancial => "/step2",
            Self::SituationDescription => "/step3",
        }
    }

    /// Parse a path, ignoring a trailing slash and any query or fragment.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Self::ALL.into_iter().find(|r| r.path() == path)
    }

    /// Where this route actually lands after redirects.
    pub fn resolve(self) -> Self {
        match self {
            Self::Home => Self::PersonalInfo,
            other => other,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Wizard states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Idle,
    Step1,
    Step2,
    Step3,
}

impl WizardStep {
    /// Pure mapping from location to step.
    pub fn from_route(route: Route) -> Self {
        match route {
            Route::Home => Self::Idle,
            Route::PersonalInfo => Self::Step1,
            Route::FamilyFinancial => Self::Step2,
            Route::SituationDescription => Self::Step3,
        }
    }

    pub fn route(&self) -> Route {
        match self {
            Self::Idle => Route::Home,
            Self::Step1 => Route::PersonalInfo,
            Self::Step2 => Route::FamilyFinancial,
            Self::Step3 => Route::SituationDescription,
        }
    }

    /// 0 for idle, 1–3 for active steps.
    pub fn index(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Step1 => 1,
            Self::Step2 => 2,
            Self::Step3 => 3,
        }
    }

    /// The slice edited on this step.
    pub fn slice(&self) -> Option<SliceKind> {
        match self {
            Self::Idle => None,
            Self::Step1 => Some(SliceKind::PersonalInfo),
            Self::Step2 => Some(SliceKind::FamilyFinancial),
            Self::Step3 => Some(SliceKind::SituationDescription),
        }
    }

    /// Target of a validated forward transition. Step 3 submits and
    /// returns to idle.
    pub fn next(&self) -> Option<WizardStep> {
        match self {
            Self::Idle => Some(Self::Step1),
            Self::Step1 => Some(Self::Step2),
            Self::Step2 => Some(Self::Step3),
            Self::Step3 => Some(Self::Idle),
        }
    }

    /// Target of an unvalidated "back".
    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            Self::Step2 => Some(Self::Step1),
            Self::Step3 => Some(Self::Step2),
            Self::Idle | Self::Step1 => None,
        }
    }

    pub fn can_transition_to(&self, target: WizardStep) -> bool {
        self.next() == Some(target) || self.previous() == Some(target)
    }

    pub fn title_key(&self) -> Option<MessageKey> {
        match self {
            Self::Idle => None,
            Self::Step1 => Some(MessageKey::Step1Title),
            Self::Step2 => Some(MessageKey::Step2Title),
            Self::Step3 => Some(MessageKey::Step3Title),
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Step1 => "step1",
            Self::Step2 => "step2",
            Self::Step3 => "step3",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse(""), Some(Route::Home));
        assert_eq!(Route::parse("/step1"), Some(Route::PersonalInfo));
        assert_eq!(Route::parse("/step2/"), Some(Route::FamilyFinancial));
        assert_eq!(Route::parse("/step3?lang=ar"), Some(Route::SituationDescription));
        assert_eq!(Route::parse("/step4"), None);
        assert_eq!(Route::parse("/401"), None);
    }

    #[test]
    fn path_roundtrip() {
        for route in Route::ALL {
            assert_eq!(Route::parse(route.path()), Some(route));
        }
    }

    #[test]
    fn home_redirects_to_step_one() {
        assert_eq!(Route::Home.resolve(), Route::PersonalInfo);
        assert_eq!(Route::FamilyFinancial.resolve(), Route::FamilyFinancial);
    }

    #[test]
    fn route_step_mapping_is_bijective() {
        for route in Route::ALL {
            assert_eq!(WizardStep::from_route(route).route(), route);
        }
        assert_eq!(WizardStep::from_route(Route::Home).index(), 0);
        assert_eq!(WizardStep::from_route(Route::SituationDescription).index(), 3);
    }

    #[test]
    fn valid_transitions() {
        use WizardStep::*;
        for (from, to) in [
            (Step1, Step2),
            (Step2, Step3),
            (Step3, Idle),
            (Step2, Step1),
            (Step3, Step2),
        ] {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use WizardStep::*;
        assert!(!Step1.can_transition_to(Step3));
        assert!(!Step1.can_transition_to(Idle));
        assert!(!Step3.can_transition_to(Step1));
        assert!(!Step2.can_transition_to(Step2));
    }

    #[test]
    fn each_active_step_owns_one_slice() {
        assert_eq!(WizardStep::Idle.slice(), None);
        assert_eq!(WizardStep::Step1.slice(), Some(SliceKind::PersonalInfo));
        assert_eq!(WizardStep::Step2.slice(), Some(SliceKind::FamilyFinancial));
        assert_eq!(
            WizardStep::Step3.slice(),
            Some(SliceKind::SituationDescription)
        );
    }

    #[test]
    fn display_matches_serde() {
        for step in [
            WizardStep::Idle,
            WizardStep::Step1,
            WizardStep::Step2,
            WizardStep::Step3,
        ] {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{step}\""), json);
        }
    }
}
