//! Account signup flow.
//!
//! Base order: account type, intents, personal or organization details,
//! ambassador role, verification, completion. `accountType` and `intents` are
//! branch fields.

mod payload;
mod rules;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::form::FormData;
use crate::step::{RegistryError, StepDefinition, StepRegistry};

pub use payload::{
    AccountType, AccountTypeForm, IntentForm, OrganizationInfoForm, PersonalInfoForm,
    RoleSelectionForm, SignupPayload, VerificationForm,
};
pub use rules::{AMBASSADOR_ROLES, INTENT_OPTIONS, INTENT_RULES};

pub const FIELD_ACCOUNT_TYPE: &str = "accountType";
pub const FIELD_INTENTS: &str = "intents";
pub const FIELD_VERIFICATION_CODE: &str = "verificationCode";
/// Where the verification code was sent, by account type.
pub const VERIFICATION_DESTINATION_FIELDS: &[&str] = &["email", "contactEmail"];

pub const INTENT_SCHOLARSHIP: &str = "Apply for Eduaid Scholarship";
pub const INTENT_SPONSOR: &str = "Sponsor or CSR Partner";
pub const INTENT_AMBASSADOR: &str = "Become Ambassador";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SignupStep {
    AccountType,
    IntentSelection,
    PersonalInfo,
    OrganizationInfo,
    RoleSelection,
    Verification,
    Completion,
}

impl SignupStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountType => "account-type",
            Self::IntentSelection => "intent-selection",
            Self::PersonalInfo => "personal-info",
            Self::OrganizationInfo => "organization-info",
            Self::RoleSelection => "role-selection",
            Self::Verification => "verification",
            Self::Completion => "completion",
        }
    }
}

impl fmt::Display for SignupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_individual(data: &FormData) -> bool {
    data.get_str(FIELD_ACCOUNT_TYPE) == Some(AccountType::Individual.as_str())
}

fn is_organization(data: &FormData) -> bool {
    data.get_str(FIELD_ACCOUNT_TYPE)
        .is_some_and(|value| value != AccountType::Individual.as_str())
}

fn wants_ambassador_role(data: &FormData) -> bool {
    data.get_str_list(FIELD_INTENTS).contains(&INTENT_AMBASSADOR)
}

/// Signup catalog.
pub fn registry() -> Result<Arc<StepRegistry<SignupStep>>, RegistryError> {
    let registry = StepRegistry::builder()
        .register(
            StepDefinition::new(SignupStep::AccountType, "Account type")
                .owns_fields(&[FIELD_ACCOUNT_TYPE])
                .validated_by(rules::validate_account_type),
        )?
        .register(
            StepDefinition::new(SignupStep::IntentSelection, "What brings you here")
                .owns_fields(&[FIELD_INTENTS])
                .validated_by(rules::validate_intents),
        )?
        .register(
            StepDefinition::new(SignupStep::PersonalInfo, "Personal information")
                .applicable_when(is_individual)
                .owns_fields(&[
                    "firstName",
                    "lastName",
                    "email",
                    "dateOfBirth",
                    "country",
                    "region",
                ])
                .validated_by(rules::validate_personal_info)
                .with_remote_check(),
        )?
        .register(
            StepDefinition::new(SignupStep::OrganizationInfo, "Organization information")
                .applicable_when(is_organization)
                .owns_fields(&[
                    "organizationName",
                    "registrationNumber",
                    "contactEmail",
                    "country",
                    "region",
                ])
                .validated_by(rules::validate_organization_info),
        )?
        .register(
            StepDefinition::new(SignupStep::RoleSelection, "Ambassador role")
                .applicable_when(wants_ambassador_role)
                .owns_fields(&["ambassadorRole", "motivation"])
                .validated_by(rules::validate_role_selection),
        )?
        .register(
            StepDefinition::new(SignupStep::Verification, "Verification")
                .owns_fields(&[FIELD_VERIFICATION_CODE])
                .validated_by(rules::validate_verification)
                .with_remote_check(),
        )?
        .register(StepDefinition::new(SignupStep::Completion, "Done").terminal())?
        .branch_field(FIELD_ACCOUNT_TYPE)
        .branch_field(FIELD_INTENTS)
        .build()?;
    Ok(Arc::new(registry))
}
