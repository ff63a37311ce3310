//! Signup wizard application layer.
//!
//! This crate contains the use cases and the async orchestration around the
//! pure wizard state machine.

pub mod usecases;

pub use usecases::{WizardOrchestrator, WizardOrchestratorError};
