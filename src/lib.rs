//! Multi-step registration wizard engine.
//!
//! The domain lives in `sw-core`, orchestration in `sw-app` and adapters in
//! `sw-infra`. This crate only assembles them for an embedding application.

pub mod bootstrap;

pub use sw_app::usecases::{
    ListReferenceChoices, ReferenceChoices, RequestCodeError, RequestVerificationCode,
    WizardOrchestrator, WizardOrchestratorError,
};
pub use sw_core::{FlowKind, FormData, WizardConfig, WizardPhase, WizardState};
