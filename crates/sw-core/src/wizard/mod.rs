//! Wizard domain module.
//!
//! This module defines the wizard state machine types and progress derivation.

mod action;
mod error;
mod event;
pub mod progress;
mod state;
pub mod state_machine;

pub use action::WizardAction;
pub use error::TransitionError;
pub use event::WizardEvent;
pub use progress::{ProgressReport, ProgressReporter};
pub use state::{ExitReason, WizardPhase, WizardState};
pub use state_machine::WizardStateMachine;
