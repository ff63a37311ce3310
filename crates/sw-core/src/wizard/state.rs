use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::form::{FormData, FormDataStore};
use crate::validation::ValidationResult;

/// Why a wizard session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExitReason {
    Submitted { reference: Option<String> },
    Abandoned,
}

/// Lifecycle phase layered on top of the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum WizardPhase {
    /// Waiting for user input on `current_step`.
    Active,
    /// A remote check for `current_step` is in flight.
    Validating { attempt: u64 },
    /// The terminal step handed the data to the submission collaborator.
    Submitting,
    Exited(ExitReason),
}

/// Complete state of one wizard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState<S: Ord> {
    pub current_step: S,
    pub completed_steps: BTreeSet<S>,
    /// Committed accumulated data; only grows through successful transitions.
    pub data: FormDataStore,
    /// What the user last typed on the current step, kept after a failed
    /// validation so messages can be shown next to the attempted values.
    pub draft: Option<FormData>,
    /// Field-level and form-level messages of the last failed validation.
    pub validation: Option<ValidationResult>,
    pub last_error: Option<String>,
    pub phase: WizardPhase,
    #[serde(default)]
    pub attempts: u64,
}

impl<S: Ord + Copy> WizardState<S> {
    pub fn new(first_step: S) -> Self {
        Self {
            current_step: first_step,
            completed_steps: BTreeSet::new(),
            data: FormDataStore::new(),
            draft: None,
            validation: None,
            last_error: None,
            phase: WizardPhase::Active,
            attempts: 0,
        }
    }

    pub fn data(&self) -> &FormData {
        self.data.snapshot()
    }

    pub fn is_completed(&self, step: S) -> bool {
        self.completed_steps.contains(&step)
    }

    pub fn is_validating(&self) -> bool {
        matches!(self.phase, WizardPhase::Validating { .. })
    }

    pub fn is_exited(&self) -> bool {
        matches!(self.phase, WizardPhase::Exited(_))
    }

    pub(crate) fn clear_feedback(&mut self) {
        self.draft = None;
        self.validation = None;
        self.last_error = None;
    }
}
