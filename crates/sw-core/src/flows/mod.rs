//! Flow catalogs.
//!
//! Each flow declares its step enum, typed step payloads and a registry with
//! illustrative validators. The state machine treats validators as opaque, so
//! caps and exclusions stay inside the flow that needs them.

pub mod judge;
pub mod signup;
pub mod sponsor;
pub mod verification;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::form::selection::{SelectionRules, SelectionViolation};
use crate::form::FormData;
use crate::step::StepKey;
use crate::validation::ValidationResult;

/// Which wizard a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowKind {
    Signup,
    Sponsor,
    Judge,
}

impl FlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Sponsor => "sponsor",
            Self::Judge => "judge",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concretely typed data of one step.
///
/// Payload enums are `#[serde(untagged)]`, so the encoded partial record only
/// carries the step's own fields.
///
/// An unset optional field (`None`) is left out of the partial record and
/// keeps whatever value is committed. Use [`StepPayload::to_partial_clearing`]
/// to remove a committed value instead.
pub trait StepPayload: Serialize {
    type Step: StepKey;

    fn step(&self) -> Self::Step;

    fn to_partial(&self) -> Result<FormData, serde_json::Error> {
        FormData::from_serializable(self)
    }

    /// Like [`StepPayload::to_partial`], but each of `fields` the payload
    /// leaves unset is sent as `null`, which removes it on merge.
    fn to_partial_clearing(&self, fields: &[&str]) -> Result<FormData, serde_json::Error> {
        let mut partial = self.to_partial()?;
        for field in fields {
            if !partial.contains(field) {
                partial.set(*field, serde_json::Value::Null);
            }
        }
        Ok(partial)
    }
}

/// Category preferences shared by the sponsor and judge applications: up to
/// three picks, no mutual exclusions.
pub const CATEGORY_OPTIONS: &[&str] = &[
    "STEM",
    "Arts",
    "Sports",
    "Entrepreneurship",
    "Community Service",
    "Leadership",
];

pub const CATEGORY_PREFERENCE_RULES: SelectionRules = SelectionRules {
    min: 1,
    max: 3,
    options: CATEGORY_OPTIONS,
    exclusive_pairs: &[],
};

pub(crate) fn selection_message(violation: &SelectionViolation) -> String {
    match violation {
        SelectionViolation::TooFew { min: 1 } => "Select at least one option".to_string(),
        other => {
            let mut message = other.to_string();
            if let Some(first) = message.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            message
        }
    }
}

pub(crate) fn check_selection(
    field: &str,
    selected: &[String],
    rules: &SelectionRules,
) -> ValidationResult {
    match rules.check(selected) {
        Ok(()) => ValidationResult::Valid,
        Err(violation) => ValidationResult::field(field, selection_message(&violation)),
    }
}

pub(crate) fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}
