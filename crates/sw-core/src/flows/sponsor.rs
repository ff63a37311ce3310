//! Sponsor / CSR partner application flow.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::flows::{check_selection, looks_like_email, StepPayload, CATEGORY_PREFERENCE_RULES};
use crate::form::FormData;
use crate::step::{RegistryError, StepDefinition, StepRegistry};
use crate::validation::{ValidationErrors, ValidationResult, ValidatorFault};

pub const FIELD_CONTRIBUTION_TYPE: &str = "contributionType";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SponsorStep {
    OrganizationProfile,
    CategoryPreferences,
    Contribution,
    InKindDetails,
    ContactPerson,
    Review,
}

impl SponsorStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrganizationProfile => "organization-profile",
            Self::CategoryPreferences => "category-preferences",
            Self::Contribution => "contribution",
            Self::InKindDetails => "in-kind-details",
            Self::ContactPerson => "contact-person",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for SponsorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionType {
    Financial,
    #[serde(rename = "In-Kind")]
    InKind,
}

impl ContributionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Financial => "Financial",
            Self::InKind => "In-Kind",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationProfileForm {
    pub organization_name: String,
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPreferencesForm {
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionForm {
    pub contribution_type: ContributionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InKindDetailsForm {
    pub in_kind_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPersonForm {
    pub contact_name: String,
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SponsorPayload {
    OrganizationProfile(OrganizationProfileForm),
    CategoryPreferences(CategoryPreferencesForm),
    Contribution(ContributionForm),
    InKindDetails(InKindDetailsForm),
    ContactPerson(ContactPersonForm),
}

impl StepPayload for SponsorPayload {
    type Step = SponsorStep;

    fn step(&self) -> SponsorStep {
        match self {
            Self::OrganizationProfile(_) => SponsorStep::OrganizationProfile,
            Self::CategoryPreferences(_) => SponsorStep::CategoryPreferences,
            Self::Contribution(_) => SponsorStep::Contribution,
            Self::InKindDetails(_) => SponsorStep::InKindDetails,
            Self::ContactPerson(_) => SponsorStep::ContactPerson,
        }
    }
}

fn gives_in_kind(data: &FormData) -> bool {
    data.get_str(FIELD_CONTRIBUTION_TYPE) == Some(ContributionType::InKind.as_str())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDraft {
    organization_name: Option<String>,
    industry: Option<String>,
}

fn validate_profile(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: ProfileDraft = data.to_typed()?;
    let mut errors = ValidationErrors::default();
    errors
        .require(
            "organizationName",
            draft.organization_name.as_deref(),
            "Organization name is required",
        )
        .require("industry", draft.industry.as_deref(), "Industry is required");
    Ok(errors.into_result())
}

#[derive(Debug, Default, Deserialize)]
struct CategoriesDraft {
    #[serde(default)]
    categories: Vec<String>,
}

fn validate_categories(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: CategoriesDraft = data.to_typed()?;
    Ok(check_selection("categories", &draft.categories, &CATEGORY_PREFERENCE_RULES))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionDraft {
    contribution_type: Option<String>,
    amount: Option<f64>,
}

fn validate_contribution(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: ContributionDraft = data.to_typed()?;
    match draft.contribution_type.as_deref() {
        Some("Financial") => match draft.amount {
            Some(amount) if amount > 0.0 => Ok(ValidationResult::Valid),
            _ => Ok(ValidationResult::field("amount", "Enter a positive amount")),
        },
        Some("In-Kind") => Ok(ValidationResult::Valid),
        _ => Ok(ValidationResult::field(
            FIELD_CONTRIBUTION_TYPE,
            "Choose how you would like to contribute",
        )),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InKindDraft {
    in_kind_description: Option<String>,
    estimated_value: Option<f64>,
}

fn validate_in_kind(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: InKindDraft = data.to_typed()?;
    let mut errors = ValidationErrors::default();
    errors.require(
        "inKindDescription",
        draft.in_kind_description.as_deref(),
        "Describe what you would like to offer",
    );
    if draft.estimated_value.is_some_and(|value| value < 0.0) {
        errors.field("estimatedValue", "Estimated value cannot be negative");
    }
    Ok(errors.into_result())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactDraft {
    contact_name: Option<String>,
    contact_email: Option<String>,
}

fn validate_contact(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: ContactDraft = data.to_typed()?;
    let mut errors = ValidationErrors::default();
    errors
        .require("contactName", draft.contact_name.as_deref(), "Contact name is required")
        .require(
            "contactEmail",
            draft.contact_email.as_deref(),
            "Contact email is required",
        );
    if let Some(email) = draft.contact_email.as_deref().filter(|e| !e.trim().is_empty()) {
        if !looks_like_email(email) {
            errors.field("contactEmail", "Enter a valid email address");
        }
    }
    Ok(errors.into_result())
}

pub fn registry() -> Result<Arc<StepRegistry<SponsorStep>>, RegistryError> {
    let registry = StepRegistry::builder()
        .register(
            StepDefinition::new(SponsorStep::OrganizationProfile, "Organization")
                .owns_fields(&["organizationName", "industry", "website"])
                .validated_by(validate_profile),
        )?
        .register(
            StepDefinition::new(SponsorStep::CategoryPreferences, "Focus areas")
                .owns_fields(&["categories"])
                .validated_by(validate_categories),
        )?
        .register(
            StepDefinition::new(SponsorStep::Contribution, "Contribution")
                .owns_fields(&[FIELD_CONTRIBUTION_TYPE, "amount"])
                .validated_by(validate_contribution),
        )?
        .register(
            StepDefinition::new(SponsorStep::InKindDetails, "In-kind details")
                .applicable_when(gives_in_kind)
                .owns_fields(&["inKindDescription", "estimatedValue"])
                .validated_by(validate_in_kind),
        )?
        .register(
            StepDefinition::new(SponsorStep::ContactPerson, "Contact person")
                .owns_fields(&["contactName", "contactEmail", "contactPhone"])
                .validated_by(validate_contact),
        )?
        .register(StepDefinition::new(SponsorStep::Review, "Review").terminal())?
        .branch_field(FIELD_CONTRIBUTION_TYPE)
        .build()?;
    Ok(Arc::new(registry))
}
