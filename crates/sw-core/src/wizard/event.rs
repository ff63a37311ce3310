use serde::{Deserialize, Serialize};

use crate::form::FormData;
use crate::validation::{ValidationResult, ValidatorFault};

/// Inputs that drive the wizard state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent<S> {
    /// Submit the current step. `expected` is the step the caller believes is
    /// current; a stale screen is rejected instead of completing a step it
    /// never showed.
    Advance {
        candidate: FormData,
        expected: Option<S>,
    },
    Retreat,
    JumpTo { step: S },
    /// Live edit of committed data without completing the step.
    Amend { partial: FormData },
    /// Result of the asynchronous check started for `attempt`.
    RemoteCheckCompleted {
        attempt: u64,
        outcome: Result<ValidationResult, ValidatorFault>,
    },
    Submit,
    SubmissionSucceeded { reference: Option<String> },
    SubmissionFailed { reason: String },
    /// The user left the wizard.
    Abandon,
    Reset,
}

impl<S> WizardEvent<S> {
    pub fn advance(candidate: FormData) -> Self {
        Self::Advance {
            candidate,
            expected: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance { .. } => "advance",
            Self::Retreat => "retreat",
            Self::JumpTo { .. } => "jump_to",
            Self::Amend { .. } => "amend",
            Self::RemoteCheckCompleted { .. } => "remote_check_completed",
            Self::Submit => "submit",
            Self::SubmissionSucceeded { .. } => "submission_succeeded",
            Self::SubmissionFailed { .. } => "submission_failed",
            Self::Abandon => "abandon",
            Self::Reset => "reset",
        }
    }
}
