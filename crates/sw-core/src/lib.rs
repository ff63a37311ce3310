//! # sw-core
//!
//! Core domain models and the wizard state machine.
//!
//! This crate contains pure logic without any infrastructure dependencies:
//! step registries and sequencing, accumulated form data, validation results,
//! the transition function, progress derivation and the port traits the
//! application layer drives.

pub mod config;
pub mod flows;
pub mod form;
pub mod ports;
pub mod step;
pub mod validation;
pub mod wizard;

// Re-export commonly used types at the crate root
pub use config::WizardConfig;
pub use flows::{FlowKind, StepPayload};
pub use form::{FormData, FormDataStore};
pub use step::sequencer::StepSequencer;
pub use step::{RegistryError, StepDefinition, StepKey, StepRegistry};
pub use validation::{ValidationErrors, ValidationResult, ValidatorFault};
pub use wizard::{
    ExitReason, ProgressReport, ProgressReporter, TransitionError, WizardAction, WizardEvent,
    WizardPhase, WizardState, WizardStateMachine,
};
