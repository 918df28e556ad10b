//! Slice records, their partial-update patches and the enumerated choices.
//!
//! Slices hold strings only, so a snapshot serializes structurally with no
//! transform step. Typed values (numbers, enums) exist only on the accepted
//! records produced by `validation`.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;

/// Which slice a record, patch or event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceKind {
    PersonalInfo,
    FamilyFinancial,
    SituationDescription,
}

impl std::fmt::Display for SliceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PersonalInfo => "personal_info",
            Self::FamilyFinancial => "family_financial",
            Self::SituationDescription => "situation_description",
        };
        write!(f, "{s}")
    }
}

/// Generates a string-only slice record, its patch type and the shallow
/// merge between them.
///
/// `update` is last-write-wins per field: every `Some` in the patch replaces
/// the stored value, every `None` leaves it untouched.
macro_rules! form_slice {
    (
        $(#[$meta:meta])*
        $name:ident, $patch:ident, $kind:expr;
        $( $field:ident => $key:literal ),+ $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            $( pub $field: String, )+
        }

        #[doc = concat!("Partial update for [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $patch {
            $( pub $field: Option<String>, )+
        }

        impl $name {
            /// Field names as they appear in forms and persisted state.
            pub const FIELDS: &'static [&'static str] = &[$( $key ),+];

            pub const KIND: SliceKind = $kind;

            /// Shallow-merge `patch` into a copy of `self`.
            pub fn update(&self, patch: $patch) -> Self {
                Self {
                    $( $field: patch.$field.unwrap_or_else(|| self.$field.clone()), )+
                }
            }

            /// The initial, empty record.
            pub fn reset() -> Self {
                Self::default()
            }

            pub fn get(&self, field: &str) -> Option<&str> {
                match field {
                    $( $key => Some(self.$field.as_str()), )+
                    _ => None,
                }
            }

            /// Number of fields holding a non-empty value.
            pub fn filled_count(&self) -> usize {
                [$( &self.$field ),+].iter().filter(|v| !v.is_empty()).count()
            }

            pub fn is_empty(&self) -> bool {
                self.filled_count() == 0
            }
        }

        impl $patch {
            /// Set one field by its form name.
            pub fn with_field(
                mut self,
                field: &str,
                value: impl Into<String>,
            ) -> Result<Self, WizardError> {
                let value = value.into();
                match field {
                    $( $key => self.$field = Some(value), )+
                    _ => {
                        return Err(WizardError::UnknownField {
                            step: $kind.to_string(),
                            field: field.to_string(),
                        })
                    }
                }
                Ok(self)
            }

            pub fn is_empty(&self) -> bool {
                $( self.$field.is_none() )&&+
            }
        }

        impl From<$name> for $patch {
            fn from(record: $name) -> Self {
                Self {
                    $( $field: Some(record.$field), )+
                }
            }
        }
    };
}

form_slice! {
    /// Step 1: who is applying.
    PersonalInfo, PersonalInfoPatch, SliceKind::PersonalInfo;
    name => "name",
    national_id => "nationalId",
    date_of_birth => "dateOfBirth",
    gender => "gender",
    address => "address",
    city => "city",
    state => "state",
    country => "country",
    phone => "phone",
    email => "email",
}

form_slice! {
    /// Step 2: household and income. Numbers are kept as typed strings.
    FamilyFinancialInfo, FamilyFinancialInfoPatch, SliceKind::FamilyFinancial;
    marital_status => "maritalStatus",
    dependents => "dependents",
    employment_status => "employmentStatus",
    monthly_income => "monthlyIncome",
    housing_status => "housingStatus",
}

form_slice! {
    /// Step 3: free-text description of the applicant's situation.
    SituationDescription, SituationDescriptionPatch, SliceKind::SituationDescription;
    current_financial_situation => "currentFinancialSituation",
    employment_circumstances => "employmentCircumstances",
    reason_for_applying => "reasonForApplying",
}

/// The free-text fields of step 3 that support AI suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SituationField {
    CurrentFinancialSituation,
    EmploymentCircumstances,
    ReasonForApplying,
}

impl SituationField {
    pub const ALL: [SituationField; 3] = [
        Self::CurrentFinancialSituation,
        Self::EmploymentCircumstances,
        Self::ReasonForApplying,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::CurrentFinancialSituation => "currentFinancialSituation",
            Self::EmploymentCircumstances => "employmentCircumstances",
            Self::ReasonForApplying => "reasonForApplying",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Current value of this field in `record`.
    pub fn value_in<'a>(&self, record: &'a SituationDescription) -> &'a str {
        match self {
            Self::CurrentFinancialSituation => &record.current_financial_situation,
            Self::EmploymentCircumstances => &record.employment_circumstances,
            Self::ReasonForApplying => &record.reason_for_applying,
        }
    }

    /// A patch that sets only this field.
    pub fn patch(&self, value: impl Into<String>) -> SituationDescriptionPatch {
        let value = Some(value.into());
        match self {
            Self::CurrentFinancialSituation => SituationDescriptionPatch {
                current_financial_situation: value,
                ..Default::default()
            },
            Self::EmploymentCircumstances => SituationDescriptionPatch {
                employment_circumstances: value,
                ..Default::default()
            },
            Self::ReasonForApplying => SituationDescriptionPatch {
                reason_for_applying: value,
                ..Default::default()
            },
        }
    }
}

impl std::fmt::Display for SituationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Generates a closed set of choices with their stored spellings.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $variant:ident => $value:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( #[serde(rename = $value)] $variant, )+
        }

        impl $name {
            /// Stored spellings, in display order.
            pub const OPTIONS: &'static [&'static str] = &[$( $value ),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $value, )+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

choice_enum! {
    Gender { Male => "male", Female => "female", Other => "other" }
}

choice_enum! {
    MaritalStatus {
        Single => "single",
        Married => "married",
        Divorced => "divorced",
        Widowed => "widowed",
    }
}

choice_enum! {
    EmploymentStatus {
        Employed => "employed",
        Unemployed => "unemployed",
        SelfEmployed => "self-employed",
        Retired => "retired",
        Student => "student",
    }
}

choice_enum! {
    HousingStatus {
        Owned => "owned",
        Rented => "rented",
        Shared => "shared",
        Homeless => "homeless",
    }
}
