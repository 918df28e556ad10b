//! Locales and the message catalog.
//!
//! Validation rules never embed text. They name a [`MessageKey`] and the
//! caller supplies a lookup, so one rule set serves every locale.

use serde::{Deserialize, Serialize};

/// Supported interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

/// Writing direction of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl Locale {
    /// Parse a language tag such as `en`, `ar` or `ar-AE`.
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Self::En),
            "ar" => Some(Self::Ar),
            _ => None,
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            Self::En => TextDirection::Ltr,
            Self::Ar => TextDirection::Rtl,
        }
    }

    pub fn is_rtl(&self) -> bool {
        self.direction() == TextDirection::Rtl
    }

    /// Native label for a language picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Ar => "العربية",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Ar => write!(f, "ar"),
        }
    }
}

/// Every user-visible message the core can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    // Personal info
    NameRequired,
    NationalIdRequired,
    DateOfBirthRequired,
    InvalidDate,
    GenderRequired,
    AddressRequired,
    CityRequired,
    StateRequired,
    CountryRequired,
    InvalidCountry,
    PhoneRequired,
    InvalidPhone,
    EmailRequired,
    InvalidEmail,
    // Family / financial
    MaritalStatusRequired,
    DependentsRequired,
    DependentsMinimum,
    EmploymentStatusRequired,
    MonthlyIncomeRequired,
    MonthlyIncomeMinimum,
    HousingStatusRequired,
    InvalidOption,
    InvalidNumber,
    // Situation
    FieldRequired,
    CurrentFinancialSituationMin,
    EmploymentCircumstancesMin,
    ReasonForApplyingMin,
    // Transport
    ErrorUnauthorized,
    ErrorForbidden,
    ErrorNotFound,
    ErrorServer,
    ErrorServiceUnavailable,
    ErrorTimeout,
    ErrorGeneric,
    ErrorUnknown,
    ErrorPrefix,
    // Notifications
    DataSubmittedSuccessfully,
    FormSubmittedDescription,
    OpenAiKeyNotConfigured,
    CouldNotGetSuggestion,
    SuggestionImproved,
    SuggestionAccepted,
    SuggestionDiscarded,
    // Screens
    Step1Title,
    Step2Title,
    Step3Title,
    PageNotFound,
    FatalTitle,
    FatalReload,
}

/// Look up the text for `key` in `locale`.
pub fn translate(locale: Locale, key: MessageKey) -> &'static str {
    match locale {
        Locale::En => english(key),
        Locale::Ar => arabic(key),
    }
}

/// A locale-bound message lookup, handed to validators and notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog {
    pub locale: Locale,
}

impl Catalog {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn t(&self, key: MessageKey) -> String {
        translate(self.locale, key).to_string()
    }
}

fn english(key: MessageKey) -> &'static str {
    use MessageKey::*;
    match key {
        NameRequired => "Name is required",
        NationalIdRequired => "National ID is required",
        DateOfBirthRequired => "Date of Birth is required",
        InvalidDate => "Enter a valid date (YYYY-MM-DD) that is not in the future",
        GenderRequired => "Gender is required",
        AddressRequired => "Address is required",
        CityRequired => "City is required",
        StateRequired => "State is required",
        CountryRequired => "Country is required",
        InvalidCountry => "Select a valid country",
        PhoneRequired => "Phone is required",
        InvalidPhone => "Enter a valid UAE mobile number (e.g. 56 673 6236)",
        EmailRequired => "Email is required",
        InvalidEmail => "Invalid email address",
        MaritalStatusRequired => "Marital Status is required",
        DependentsRequired => "Number of dependents is required",
        DependentsMinimum => "Dependents cannot be negative",
        EmploymentStatusRequired => "Employment Status is required",
        MonthlyIncomeRequired => "Monthly Income is required",
        MonthlyIncomeMinimum => "Monthly Income cannot be negative",
        HousingStatusRequired => "Housing Status is required",
        InvalidOption => "Select one of the available options",
        InvalidNumber => "Enter a whole number",
        FieldRequired => "This field is required",
        CurrentFinancialSituationMin => {
            "Please describe your financial situation in at least 10 characters"
        }
        EmploymentCircumstancesMin => {
            "Please describe your employment circumstances in at least 10 characters"
        }
        ReasonForApplyingMin => "Please describe your reason for applying in at least 10 characters",
        ErrorUnauthorized => "Unauthorized. Please check your API key.",
        ErrorForbidden => "Access forbidden.",
        ErrorNotFound => "The requested resource was not found.",
        ErrorServer => "Server error. Please try again later.",
        ErrorServiceUnavailable => "Service unavailable. Please try again later.",
        ErrorTimeout => "The request timed out. Please try again.",
        ErrorGeneric => "Something went wrong. Please try again.",
        ErrorUnknown => "An unknown error occurred.",
        ErrorPrefix => "Error",
        DataSubmittedSuccessfully => "Data submitted successfully",
        FormSubmittedDescription => "Your application has been received.",
        OpenAiKeyNotConfigured => "AI suggestions are not configured (missing API key).",
        CouldNotGetSuggestion => "Could not get a suggestion. Please try again.",
        SuggestionImproved => "Suggestion improved",
        SuggestionAccepted => "Suggestion accepted",
        SuggestionDiscarded => "Suggestion discarded",
        Step1Title => "Step 1: Personal Information",
        Step2Title => "Step 2: Family & Financial Information",
        Step3Title => "Step 3: Situation Description",
        PageNotFound => "Page not found",
        FatalTitle => "Something went wrong",
        FatalReload => "Press Enter to reload, or type quit to exit.",
    }
}

fn arabic(key: MessageKey) -> &'static str {
    use MessageKey::*;
    match key {
        NameRequired => "الاسم مطلوب",
        NationalIdRequired => "رقم الهوية الوطنية مطلوب",
        DateOfBirthRequired => "تاريخ الميلاد مطلوب",
        InvalidDate => "أدخل تاريخًا صالحًا (YYYY-MM-DD) لا يقع في المستقبل",
        GenderRequired => "الجنس مطلوب",
        AddressRequired => "العنوان مطلوب",
        CityRequired => "المدينة مطلوبة",
        StateRequired => "الإمارة مطلوبة",
        CountryRequired => "الدولة مطلوبة",
        InvalidCountry => "اختر دولة صالحة",
        PhoneRequired => "رقم الهاتف مطلوب",
        InvalidPhone => "أدخل رقم هاتف متحرك إماراتي صالح (مثال: 56 673 6236)",
        EmailRequired => "البريد الإلكتروني مطلوب",
        InvalidEmail => "عنوان البريد الإلكتروني غير صالح",
        MaritalStatusRequired => "الحالة الاجتماعية مطلوبة",
        DependentsRequired => "عدد المعالين مطلوب",
        DependentsMinimum => "لا يمكن أن يكون عدد المعالين سالبًا",
        EmploymentStatusRequired => "الحالة الوظيفية مطلوبة",
        MonthlyIncomeRequired => "الدخل الشهري مطلوب",
        MonthlyIncomeMinimum => "لا يمكن أن يكون الدخل الشهري سالبًا",
        HousingStatusRequired => "حالة السكن مطلوبة",
        InvalidOption => "اختر أحد الخيارات المتاحة",
        InvalidNumber => "أدخل رقمًا صحيحًا",
        FieldRequired => "هذا الحقل مطلوب",
        CurrentFinancialSituationMin => "يرجى وصف وضعك المالي في 10 أحرف على الأقل",
        EmploymentCircumstancesMin => "يرجى وصف ظروف عملك في 10 أحرف على الأقل",
        ReasonForApplyingMin => "يرجى وصف سبب التقديم في 10 أحرف على الأقل",
        ErrorUnauthorized => "غير مصرح. يرجى التحقق من مفتاح الواجهة البرمجية.",
        ErrorForbidden => "الوصول مرفوض.",
        ErrorNotFound => "المورد المطلوب غير موجود.",
        ErrorServer => "خطأ في الخادم. يرجى المحاولة لاحقًا.",
        ErrorServiceUnavailable => "الخدمة غير متاحة. يرجى المحاولة لاحقًا.",
        ErrorTimeout => "انتهت مهلة الطلب. يرجى المحاولة مرة أخرى.",
        ErrorGeneric => "حدث خطأ ما. يرجى المحاولة مرة أخرى.",
        ErrorUnknown => "حدث خطأ غير معروف.",
        ErrorPrefix => "خطأ",
        DataSubmittedSuccessfully => "تم إرسال البيانات بنجاح",
        FormSubmittedDescription => "تم استلام طلبك.",
        OpenAiKeyNotConfigured => "اقتراحات الذكاء الاصطناعي غير مهيأة (مفتاح الواجهة البرمجية مفقود).",
        CouldNotGetSuggestion => "تعذر الحصول على اقتراح. يرجى المحاولة مرة أخرى.",
        SuggestionImproved => "تم تحسين الاقتراح",
        SuggestionAccepted => "تم قبول الاقتراح",
        SuggestionDiscarded => "تم تجاهل الاقتراح",
        Step1Title => "الخطوة 1: المعلومات الشخصية",
        Step2Title => "الخطوة 2: المعلومات العائلية والمالية",
        Step3Title => "الخطوة 3: وصف الحالة",
        PageNotFound => "الصفحة غير موجودة",
        FatalTitle => "حدث خطأ ما",
        FatalReload => "اضغط Enter لإعادة التحميل، أو اكتب quit للخروج.",
    }
}
