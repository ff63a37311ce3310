//! Illustrative signup validators.
//!
//! Each validator reads a loose draft view of the merged record: missing or
//! blank fields become field messages, while values of the wrong JSON type
//! mean the record is malformed and surface as a `ValidatorFault`.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use super::{AccountType, INTENT_SCHOLARSHIP, INTENT_SPONSOR};
use crate::flows::{check_selection, looks_like_email};
use crate::form::selection::SelectionRules;
use crate::form::FormData;
use crate::validation::{ValidationErrors, ValidationResult, ValidatorFault};

pub const INTENT_OPTIONS: &[&str] = &[
    INTENT_SCHOLARSHIP,
    INTENT_SPONSOR,
    super::INTENT_AMBASSADOR,
    "Volunteer as Judge",
    "Donate",
    "Mentor Students",
    "Stay Informed",
];

/// At most six intents; applying for a scholarship and sponsoring exclude
/// each other.
pub const INTENT_RULES: SelectionRules = SelectionRules {
    min: 1,
    max: 6,
    options: INTENT_OPTIONS,
    exclusive_pairs: &[(INTENT_SCHOLARSHIP, INTENT_SPONSOR)],
};

pub const AMBASSADOR_ROLES: &[&str] = &[
    "Campus Ambassador",
    "Community Ambassador",
    "Online Ambassador",
];

const MOTIVATION_MAX_CHARS: usize = 500;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountTypeDraft {
    account_type: Option<String>,
}

pub(super) fn validate_account_type(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: AccountTypeDraft = data.to_typed()?;
    let Some(raw) = draft.account_type else {
        return Ok(ValidationResult::field(
            "accountType",
            "Choose an account type",
        ));
    };
    match serde_json::from_value::<AccountType>(serde_json::Value::String(raw)) {
        Ok(_) => Ok(ValidationResult::Valid),
        Err(_) => Ok(ValidationResult::field(
            "accountType",
            "Unknown account type",
        )),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentDraft {
    #[serde(default)]
    intents: Vec<String>,
}

pub(super) fn validate_intents(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: IntentDraft = data.to_typed()?;
    Ok(check_selection("intents", &draft.intents, &INTENT_RULES))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonalInfoDraft {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    date_of_birth: Option<String>,
    country: Option<String>,
}

pub(super) fn validate_personal_info(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: PersonalInfoDraft = data.to_typed()?;
    let mut errors = ValidationErrors::default();
    errors
        .require("firstName", draft.first_name.as_deref(), "First name is required")
        .require("lastName", draft.last_name.as_deref(), "Last name is required")
        .require("email", draft.email.as_deref(), "Email is required")
        .require("dateOfBirth", draft.date_of_birth.as_deref(), "Date of birth is required")
        .require("country", draft.country.as_deref(), "Country is required");

    if let Some(email) = draft.email.as_deref().filter(|e| !e.trim().is_empty()) {
        if !looks_like_email(email) {
            errors.field("email", "Enter a valid email address");
        }
    }
    if let Some(raw) = draft.date_of_birth.as_deref().filter(|d| !d.trim().is_empty()) {
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) if date >= Utc::now().date_naive() => {
                errors.field("dateOfBirth", "Date of birth must be in the past");
            }
            Ok(_) => {}
            Err(_) => {
                errors.field("dateOfBirth", "Use the YYYY-MM-DD format");
            }
        }
    }
    Ok(errors.into_result())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationInfoDraft {
    organization_name: Option<String>,
    contact_email: Option<String>,
    country: Option<String>,
}

pub(super) fn validate_organization_info(
    data: &FormData,
) -> Result<ValidationResult, ValidatorFault> {
    let draft: OrganizationInfoDraft = data.to_typed()?;
    let mut errors = ValidationErrors::default();
    errors
        .require(
            "organizationName",
            draft.organization_name.as_deref(),
            "Organization name is required",
        )
        .require(
            "contactEmail",
            draft.contact_email.as_deref(),
            "Contact email is required",
        )
        .require("country", draft.country.as_deref(), "Country is required");
    if let Some(email) = draft.contact_email.as_deref().filter(|e| !e.trim().is_empty()) {
        if !looks_like_email(email) {
            errors.field("contactEmail", "Enter a valid email address");
        }
    }
    Ok(errors.into_result())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleSelectionDraft {
    ambassador_role: Option<String>,
    motivation: Option<String>,
}

pub(super) fn validate_role_selection(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: RoleSelectionDraft = data.to_typed()?;
    let mut errors = ValidationErrors::default();
    match draft.ambassador_role.as_deref() {
        None => {
            errors.field("ambassadorRole", "Choose a role");
        }
        Some(role) if !AMBASSADOR_ROLES.contains(&role) => {
            errors.field("ambassadorRole", "Choose one of the listed roles");
        }
        Some(_) => {}
    }
    errors.require(
        "motivation",
        draft.motivation.as_deref(),
        "Tell us why you want to join",
    );
    if draft
        .motivation
        .as_deref()
        .is_some_and(|m| m.chars().count() > MOTIVATION_MAX_CHARS)
    {
        errors.field(
            "motivation",
            format!("Keep it under {MOTIVATION_MAX_CHARS} characters"),
        );
    }
    Ok(errors.into_result())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerificationDraft {
    verification_code: Option<String>,
}

pub(super) fn validate_verification(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: VerificationDraft = data.to_typed()?;
    let code = draft.verification_code.unwrap_or_default();
    let code = code.trim();
    if code.is_empty() {
        return Ok(ValidationResult::field(
            "verificationCode",
            "Enter the code we sent you",
        ));
    }
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Ok(ValidationResult::field(
            "verificationCode",
            "The code has six digits",
        ));
    }
    Ok(ValidationResult::Valid)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn account_type_must_be_known() -> Result<(), ValidatorFault> {
        let result = validate_account_type(&FormData::new().with("accountType", "Alien"))?;
        assert_eq!(result.field_error("accountType"), Some("Unknown account type"));
        assert!(validate_account_type(&FormData::new().with("accountType", "Non-Profit"))?.is_valid());
        Ok(())
    }

    #[test]
    fn intents_need_one_and_respect_exclusion() -> Result<(), ValidatorFault> {
        let empty = validate_intents(&FormData::new().with("intents", json!([])))?;
        assert_eq!(empty.field_error("intents"), Some("Select at least one option"));

        let clash = validate_intents(
            &FormData::new().with("intents", json!([INTENT_SCHOLARSHIP, INTENT_SPONSOR])),
        )?;
        assert!(!clash.is_valid());

        let six: Vec<&str> = INTENT_OPTIONS.iter().skip(1).copied().collect();
        assert!(validate_intents(&FormData::new().with("intents", json!(six)))?.is_valid());
        Ok(())
    }

    #[test]
    fn wrongly_typed_intents_are_a_fault() {
        let result = validate_intents(&FormData::new().with("intents", "Donate"));
        assert!(result.is_err());
    }

    #[test]
    fn personal_info_checks_email_and_birth_date() -> Result<(), ValidatorFault> {
        let data = FormData::new()
            .with("firstName", "Ada")
            .with("lastName", "Lovelace")
            .with("email", "ada-at-example")
            .with("dateOfBirth", "2999-01-01")
            .with("country", "GB");
        let result = validate_personal_info(&data)?;
        assert_eq!(result.field_error("email"), Some("Enter a valid email address"));
        assert_eq!(
            result.field_error("dateOfBirth"),
            Some("Date of birth must be in the past")
        );

        let fixed = data
            .with("email", "ada@example.org")
            .with("dateOfBirth", "1990-12-10");
        assert!(validate_personal_info(&fixed)?.is_valid());
        Ok(())
    }

    #[test]
    fn verification_code_is_six_digits() -> Result<(), ValidatorFault> {
        let short = validate_verification(&FormData::new().with("verificationCode", "123"))?;
        assert_eq!(short.field_error("verificationCode"), Some("The code has six digits"));
        assert!(validate_verification(&FormData::new().with("verificationCode", "042917"))?.is_valid());
        Ok(())
    }

    #[test]
    fn role_must_come_from_the_list() -> Result<(), ValidatorFault> {
        let data = FormData::new()
            .with("ambassadorRole", "Chief Ambassador")
            .with("motivation", "I run a coding club");
        let result = validate_role_selection(&data)?;
        assert_eq!(
            result.field_error("ambassadorRole"),
            Some("Choose one of the listed roles")
        );
        Ok(())
    }
}
