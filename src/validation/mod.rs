//! Per-step validators.
//!
//! A validator takes a slice record and a message lookup and returns either
//! an accepted record with typed values or the per-field errors. It never
//! fails any other way.

pub mod rules;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::form::{
    EmploymentStatus, FamilyFinancialInfo, Gender, HousingStatus, MaritalStatus, PersonalInfo,
    SituationDescription,
};
use crate::i18n::MessageKey;
use crate::phone;

pub use rules::{Rule, first_failure};

/// Minimum length of each situation text.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Field name → rendered error message, one entry per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn insert(&mut self, field: &'static str, message: String) {
        self.0.entry(field).or_insert(message);
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Accepted step-1 record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPersonalInfo {
    pub name: String,
    pub national_id: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: String,
    pub city: String,
    pub state: String,
    /// Upper-case ISO 3166 alpha-2.
    pub country: String,
    /// Canonical digits with calling code.
    pub phone: String,
    pub email: String,
}

impl ValidPersonalInfo {
    /// Back to the string-only slice form, with normalized values.
    pub fn into_record(self) -> PersonalInfo {
        PersonalInfo {
            name: self.name,
            national_id: self.national_id,
            date_of_birth: self.date_of_birth.format(rules::DATE_FORMAT).to_string(),
            gender: self.gender.to_string(),
            address: self.address,
            city: self.city,
            state: self.state,
            country: self.country,
            phone: self.phone,
            email: self.email,
        }
    }
}

/// Accepted step-2 record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFamilyFinancial {
    pub marital_status: MaritalStatus,
    pub dependents: u32,
    pub employment_status: EmploymentStatus,
    pub monthly_income: u64,
    pub housing_status: HousingStatus,
}

impl ValidFamilyFinancial {
    pub fn into_record(self) -> FamilyFinancialInfo {
        FamilyFinancialInfo {
            marital_status: self.marital_status.to_string(),
            dependents: self.dependents.to_string(),
            employment_status: self.employment_status.to_string(),
            monthly_income: self.monthly_income.to_string(),
            housing_status: self.housing_status.to_string(),
        }
    }
}

/// Accepted step-3 record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSituation {
    pub current_financial_situation: String,
    pub employment_circumstances: String,
    pub reason_for_applying: String,
}

impl ValidSituation {
    pub fn into_record(self) -> SituationDescription {
        SituationDescription {
            current_financial_situation: self.current_financial_situation,
            employment_circumstances: self.employment_circumstances,
            reason_for_applying: self.reason_for_applying,
        }
    }
}

/// Accumulates the first error of each field while converting values.
struct Checker<'a> {
    t: &'a dyn Fn(MessageKey) -> String,
    errors: FieldErrors,
}

impl<'a> Checker<'a> {
    fn new(t: &'a dyn Fn(MessageKey) -> String) -> Self {
        Self {
            t,
            errors: FieldErrors::default(),
        }
    }

    fn text(&mut self, field: &'static str, value: &str, rules: &[Rule]) -> Option<String> {
        self.parsed(field, value, rules, |v| Some(v.trim().to_string()))
    }

    /// Apply `rules`, then `convert`. Conversions only fail on numeric
    /// overflow once the rules pass.
    fn parsed<T>(
        &mut self,
        field: &'static str,
        value: &str,
        rules: &[Rule],
        convert: impl FnOnce(&str) -> Option<T>,
    ) -> Option<T> {
        if let Some(key) = first_failure(value, rules) {
            self.errors.insert(field, (self.t)(key));
            return None;
        }
        let converted = convert(value.trim());
        if converted.is_none() {
            let key = if rules.iter().any(|r| matches!(r, Rule::Integer)) {
                MessageKey::InvalidNumber
            } else {
                MessageKey::InvalidOption
            };
            self.errors.insert(field, (self.t)(key));
        }
        converted
    }

    fn finish<T>(self, accepted: Option<T>) -> Result<T, FieldErrors> {
        match accepted {
            Some(record) if self.errors.is_empty() => Ok(record),
            _ => Err(self.errors),
        }
    }
}

/// Validate step 1.
pub fn validate_personal_info(
    record: &PersonalInfo,
    t: impl Fn(MessageKey) -> String,
) -> Result<ValidPersonalInfo, FieldErrors> {
    use MessageKey::*;
    let mut c = Checker::new(&t);

    let name = c.text("name", &record.name, &[Rule::Required(NameRequired)]);
    let national_id = c.text(
        "nationalId",
        &record.national_id,
        &[Rule::Required(NationalIdRequired)],
    );
    let date_of_birth = c.parsed(
        "dateOfBirth",
        &record.date_of_birth,
        &[Rule::Required(DateOfBirthRequired), Rule::PastDate],
        rules::parse_past_date,
    );
    let gender = c.parsed(
        "gender",
        &record.gender,
        &[Rule::Required(GenderRequired), Rule::OneOf(Gender::OPTIONS)],
        Gender::parse,
    );
    let address = c.text("address", &record.address, &[Rule::Required(AddressRequired)]);
    let city = c.text("city", &record.city, &[Rule::Required(CityRequired)]);
    let state = c.text("state", &record.state, &[Rule::Required(StateRequired)]);
    let country = c.parsed(
        "country",
        &record.country,
        &[Rule::Required(CountryRequired), Rule::CountryCode],
        |v| Some(v.to_ascii_uppercase()),
    );
    let phone = c.parsed(
        "phone",
        &record.phone,
        &[Rule::Required(PhoneRequired), Rule::Phone],
        |v| Some(phone::to_canonical(v)),
    );
    let email = c.text(
        "email",
        &record.email,
        &[Rule::Required(EmailRequired), Rule::Email],
    );

    let accepted = (|| {
        Some(ValidPersonalInfo {
            name: name?,
            national_id: national_id?,
            date_of_birth: date_of_birth?,
            gender: gender?,
            address: address?,
            city: city?,
            state: state?,
            country: country?,
            phone: phone?,
            email: email?,
        })
    })();
    c.finish(accepted)
}

/// Validate step 2. Numeric strings are coerced to numbers.
pub fn validate_family_financial(
    record: &FamilyFinancialInfo,
    t: impl Fn(MessageKey) -> String,
) -> Result<ValidFamilyFinancial, FieldErrors> {
    use MessageKey::*;
    let mut c = Checker::new(&t);

    let marital_status = c.parsed(
        "maritalStatus",
        &record.marital_status,
        &[
            Rule::Required(MaritalStatusRequired),
            Rule::OneOf(MaritalStatus::OPTIONS),
        ],
        MaritalStatus::parse,
    );
    let dependents = c.parsed(
        "dependents",
        &record.dependents,
        &[
            Rule::Required(DependentsRequired),
            Rule::Integer,
            Rule::Min(0, DependentsMinimum),
        ],
        |v| v.parse::<u32>().ok(),
    );
    let employment_status = c.parsed(
        "employmentStatus",
        &record.employment_status,
        &[
            Rule::Required(EmploymentStatusRequired),
            Rule::OneOf(EmploymentStatus::OPTIONS),
        ],
        EmploymentStatus::parse,
    );
    let monthly_income = c.parsed(
        "monthlyIncome",
        &record.monthly_income,
        &[
            Rule::Required(MonthlyIncomeRequired),
            Rule::Integer,
            Rule::Min(0, MonthlyIncomeMinimum),
        ],
        |v| v.parse::<u64>().ok(),
    );
    let housing_status = c.parsed(
        "housingStatus",
        &record.housing_status,
        &[
            Rule::Required(HousingStatusRequired),
            Rule::OneOf(HousingStatus::OPTIONS),
        ],
        HousingStatus::parse,
    );

    let accepted = (|| {
        Some(ValidFamilyFinancial {
            marital_status: marital_status?,
            dependents: dependents?,
            employment_status: employment_status?,
            monthly_income: monthly_income?,
            housing_status: housing_status?,
        })
    })();
    c.finish(accepted)
}

/// Validate step 3: every text required and at least
/// [`MIN_DESCRIPTION_CHARS`] long.
pub fn validate_situation(
    record: &SituationDescription,
    t: impl Fn(MessageKey) -> String,
) -> Result<ValidSituation, FieldErrors> {
    use MessageKey::*;
    let mut c = Checker::new(&t);
    let text_rules = |min_key| {
        [
            Rule::Required(FieldRequired),
            Rule::MinChars(MIN_DESCRIPTION_CHARS, min_key),
        ]
    };

    let current_financial_situation = c.text(
        "currentFinancialSituation",
        &record.current_financial_situation,
        &text_rules(CurrentFinancialSituationMin),
    );
    let employment_circumstances = c.text(
        "employmentCircumstances",
        &record.employment_circumstances,
        &text_rules(EmploymentCircumstancesMin),
    );
    let reason_for_applying = c.text(
        "reasonForApplying",
        &record.reason_for_applying,
        &text_rules(ReasonForApplyingMin),
    );

    let accepted = (|| {
        Some(ValidSituation {
            current_financial_situation: current_financial_situation?,
            employment_circumstances: employment_circumstances?,
            reason_for_applying: reason_for_applying?,
        })
    })();
    c.finish(accepted)
}
