//! Volunteer judge application flow.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::flows::{check_selection, looks_like_email, StepPayload, CATEGORY_PREFERENCE_RULES};
use crate::form::FormData;
use crate::step::{RegistryError, StepDefinition, StepRegistry};
use crate::validation::{ValidationErrors, ValidationResult, ValidatorFault};

pub const FIELD_HAS_JUDGED_BEFORE: &str = "hasJudgedBefore";

pub const AVAILABILITY_OPTIONS: &[&str] = &["Weekdays", "Weekends", "Evenings", "Remote only"];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum JudgeStep {
    JudgeProfile,
    Expertise,
    Experience,
    PastEvents,
    Availability,
    Review,
}

impl JudgeStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JudgeProfile => "judge-profile",
            Self::Expertise => "expertise",
            Self::Experience => "experience",
            Self::PastEvents => "past-events",
            Self::Availability => "availability",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for JudgeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeProfileForm {
    pub full_name: String,
    pub email: String,
    pub occupation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertiseForm {
    pub expertise: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceForm {
    pub years_of_experience: u32,
    pub has_judged_before: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastEventsForm {
    pub past_events: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityForm {
    pub availability: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum JudgePayload {
    Profile(JudgeProfileForm),
    Expertise(ExpertiseForm),
    Experience(ExperienceForm),
    PastEvents(PastEventsForm),
    Availability(AvailabilityForm),
}

impl StepPayload for JudgePayload {
    type Step = JudgeStep;

    fn step(&self) -> JudgeStep {
        match self {
            Self::Profile(_) => JudgeStep::JudgeProfile,
            Self::Expertise(_) => JudgeStep::Expertise,
            Self::Experience(_) => JudgeStep::Experience,
            Self::PastEvents(_) => JudgeStep::PastEvents,
            Self::Availability(_) => JudgeStep::Availability,
        }
    }
}

fn has_judged_before(data: &FormData) -> bool {
    data.get_bool(FIELD_HAS_JUDGED_BEFORE) == Some(true)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDraft {
    full_name: Option<String>,
    email: Option<String>,
    occupation: Option<String>,
}

fn validate_profile(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: ProfileDraft = data.to_typed()?;
    let mut errors = ValidationErrors::default();
    errors
        .require("fullName", draft.full_name.as_deref(), "Full name is required")
        .require("email", draft.email.as_deref(), "Email is required")
        .require("occupation", draft.occupation.as_deref(), "Occupation is required");
    if let Some(email) = draft.email.as_deref().filter(|e| !e.trim().is_empty()) {
        if !looks_like_email(email) {
            errors.field("email", "Enter a valid email address");
        }
    }
    Ok(errors.into_result())
}

#[derive(Debug, Default, Deserialize)]
struct ExpertiseDraft {
    #[serde(default)]
    expertise: Vec<String>,
}

fn validate_expertise(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: ExpertiseDraft = data.to_typed()?;
    Ok(check_selection("expertise", &draft.expertise, &CATEGORY_PREFERENCE_RULES))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExperienceDraft {
    years_of_experience: Option<u32>,
    has_judged_before: Option<bool>,
}

fn validate_experience(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: ExperienceDraft = data.to_typed()?;
    let mut errors = ValidationErrors::default();
    if draft.years_of_experience.is_none() {
        errors.field("yearsOfExperience", "Tell us how many years of experience you have");
    }
    if draft.has_judged_before.is_none() {
        errors.field(FIELD_HAS_JUDGED_BEFORE, "Let us know if you have judged before");
    }
    Ok(errors.into_result())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PastEventsDraft {
    past_events: Option<String>,
}

fn validate_past_events(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: PastEventsDraft = data.to_typed()?;
    let mut errors = ValidationErrors::default();
    errors.require(
        "pastEvents",
        draft.past_events.as_deref(),
        "List at least one event you judged",
    );
    Ok(errors.into_result())
}

#[derive(Debug, Default, Deserialize)]
struct AvailabilityDraft {
    #[serde(default)]
    availability: Vec<String>,
}

fn validate_availability(data: &FormData) -> Result<ValidationResult, ValidatorFault> {
    let draft: AvailabilityDraft = data.to_typed()?;
    if draft.availability.is_empty() {
        return Ok(ValidationResult::field(
            "availability",
            "Select at least one option",
        ));
    }
    if let Some(unknown) = draft
        .availability
        .iter()
        .find(|slot| !AVAILABILITY_OPTIONS.contains(&slot.as_str()))
    {
        return Ok(ValidationResult::field(
            "availability",
            format!("\"{unknown}\" is not an available option"),
        ));
    }
    Ok(ValidationResult::Valid)
}

pub fn registry() -> Result<Arc<StepRegistry<JudgeStep>>, RegistryError> {
    let registry = StepRegistry::builder()
        .register(
            StepDefinition::new(JudgeStep::JudgeProfile, "About you")
                .owns_fields(&["fullName", "email", "occupation"])
                .validated_by(validate_profile),
        )?
        .register(
            StepDefinition::new(JudgeStep::Expertise, "Expertise")
                .owns_fields(&["expertise"])
                .validated_by(validate_expertise),
        )?
        .register(
            StepDefinition::new(JudgeStep::Experience, "Experience")
                .owns_fields(&["yearsOfExperience", FIELD_HAS_JUDGED_BEFORE])
                .validated_by(validate_experience),
        )?
        .register(
            StepDefinition::new(JudgeStep::PastEvents, "Past events")
                .applicable_when(has_judged_before)
                .owns_fields(&["pastEvents"])
                .validated_by(validate_past_events),
        )?
        .register(
            StepDefinition::new(JudgeStep::Availability, "Availability")
                .owns_fields(&["availability"])
                .validated_by(validate_availability),
        )?
        .register(StepDefinition::new(JudgeStep::Review, "Review").terminal())?
        .branch_field(FIELD_HAS_JUDGED_BEFORE)
        .build()?;
    Ok(Arc::new(registry))
}
