use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transition requests the machine refused, or could not complete.
///
/// These never escape as `Err` to the renderer; the machine records them in
/// `WizardState::last_error` and leaves the rest of the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionError {
    #[error("validator for step {step} failed: {reason}")]
    ValidatorFault { step: String, reason: String },
    #[error("cannot jump to step {target}")]
    JumpNotAllowed { target: String },
    #[error("step {expected} is no longer current (current is {current})")]
    StaleStep { expected: String, current: String },
    #[error("a validation is pending for step {step}")]
    ValidationPending { step: String },
    #[error("the wizard has exited")]
    Exited,
    #[error("step {step} is the last step")]
    TerminalStep { step: String },
    #[error("step {step} is the first step")]
    FirstStep { step: String },
    #[error("submission is only available from the final step")]
    NotAtTerminal,
    #[error("step {step} must be completed before submitting")]
    IncompleteStep { step: String },
    #[error("a submission is already in progress")]
    SubmissionInProgress,
    #[error("no applicable step remains")]
    NoApplicableStep,
}
