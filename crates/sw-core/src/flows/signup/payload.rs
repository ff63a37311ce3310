use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::SignupStep;
use crate::flows::StepPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Individual,
    School,
    Corporate,
    #[serde(rename = "Non-Profit")]
    NonProfit,
    Government,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::School => "School",
            Self::Corporate => "Corporate",
            Self::NonProfit => "Non-Profit",
            Self::Government => "Government",
        }
    }

    pub fn is_organization(&self) -> bool {
        !matches!(self, Self::Individual)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTypeForm {
    pub account_type: AccountType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentForm {
    pub intents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationInfoForm {
    pub organization_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    pub contact_email: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSelectionForm {
    pub ambassador_role: String,
    pub motivation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationForm {
    pub verification_code: String,
}

/// Candidate data of one signup step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SignupPayload {
    AccountType(AccountTypeForm),
    Intents(IntentForm),
    PersonalInfo(PersonalInfoForm),
    OrganizationInfo(OrganizationInfoForm),
    RoleSelection(RoleSelectionForm),
    Verification(VerificationForm),
}

impl StepPayload for SignupPayload {
    type Step = SignupStep;

    fn step(&self) -> SignupStep {
        match self {
            Self::AccountType(_) => SignupStep::AccountType,
            Self::Intents(_) => SignupStep::IntentSelection,
            Self::PersonalInfo(_) => SignupStep::PersonalInfo,
            Self::OrganizationInfo(_) => SignupStep::OrganizationInfo,
            Self::RoleSelection(_) => SignupStep::RoleSelection,
            Self::Verification(_) => SignupStep::Verification,
        }
    }
}
