//! Use cases of the signup wizard.
//!
//! The orchestrator owns a session; the smaller use cases serve individual
//! steps (choice lists, verification codes) and never touch wizard state.

pub mod check_verification_code;
pub mod list_reference_choices;
pub mod request_verification_code;
pub mod wizard;

pub use check_verification_code::CheckVerificationCode;
pub use list_reference_choices::{ListReferenceChoices, ReferenceChoices};
pub use request_verification_code::{RequestCodeError, RequestVerificationCode};
pub use wizard::{WizardOrchestrator, WizardOrchestratorBuilder, WizardOrchestratorError};
