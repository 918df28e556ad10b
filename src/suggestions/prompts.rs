//! Prompt templates for situation suggestions.
//!
//! Every prompt is the base instruction followed by either a per-field
//! "write from scratch" template or the "improve this text" template.

use crate::form::SituationField;
use crate::i18n::Locale;

fn base(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "\
You are helping a person fill in an application for financial social support. \
Write in the first person, in plain and respectful language, as one short paragraph \
of no more than 120 words. Do not invent names, amounts or dates.",
        Locale::Ar => "\
أنت تساعد شخصًا في تعبئة طلب للحصول على دعم اجتماعي مالي. \
اكتب بصيغة المتكلم وبلغة عربية واضحة ومحترمة، في فقرة قصيرة واحدة لا تتجاوز 120 كلمة. \
لا تخترع أسماء أو مبالغ أو تواريخ.",
    }
}

fn scratch(locale: Locale, field: SituationField) -> &'static str {
    match (locale, field) {
        (Locale::En, SituationField::CurrentFinancialSituation) => "\
Describe a household's current financial hardship: income that does not cover \
essential expenses such as rent, food and utilities.",
        (Locale::En, SituationField::EmploymentCircumstances) => "\
Describe the applicant's employment circumstances: recent job loss or reduced hours, \
and the efforts being made to find stable work.",
        (Locale::En, SituationField::ReasonForApplying) => "\
Explain why the applicant is applying for social support and how the assistance \
would help them regain stability.",
        (Locale::Ar, SituationField::CurrentFinancialSituation) => "\
صف الضائقة المالية الحالية للأسرة: دخل لا يغطي النفقات الأساسية مثل الإيجار والطعام والخدمات.",
        (Locale::Ar, SituationField::EmploymentCircumstances) => "\
صف الظروف الوظيفية لمقدم الطلب: فقدان العمل مؤخرًا أو تقليل ساعات العمل، والجهود المبذولة لإيجاد عمل مستقر.",
        (Locale::Ar, SituationField::ReasonForApplying) => "\
اشرح سبب تقدم الشخص بطلب الدعم الاجتماعي وكيف ستساعده المساعدة على استعادة الاستقرار.",
    }
}

fn improve(locale: Locale, current: &str) -> String {
    match locale {
        Locale::En => format!(
            "Improve the following text, keeping its meaning and facts: \"{}\"",
            current.trim()
        ),
        Locale::Ar => format!(
            "حسّن النص التالي مع الحفاظ على معناه وحقائقه: \"{}\"",
            current.trim()
        ),
    }
}

/// Prompt for a fresh request on `field`. Non-blank `current` text is
/// improved; blank text gets the field's own template.
pub fn field_prompt(locale: Locale, field: SituationField, current: &str) -> String {
    let instruction = if current.trim().is_empty() {
        scratch(locale, field).to_string()
    } else {
        improve(locale, current)
    };
    format!("{} {}", base(locale), instruction)
}

/// Prompt for regenerating from the staged suggestion.
pub fn regenerate_prompt(locale: Locale, staged: &str) -> String {
    format!("{} {}", base(locale), improve(locale, staged))
}
