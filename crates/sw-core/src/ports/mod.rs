//! Port interfaces for the application layer
//!
//! Ports define the contract between the wizard engine and the collaborators
//! that live outside it: submission, remote checks, reference data, state
//! observers, verification-code delivery and time. Implementations are
//! provided by `sw-infra` or by the embedding application.

mod clock;
pub mod reference_data;
pub mod remote_check;
pub mod submission;
pub mod verification;
pub mod wizard_event;

pub use clock::ClockPort;
pub use reference_data::{ReferenceDataPort, ReferenceOption};
pub use remote_check::RemoteCheckPort;
pub use submission::{SubmissionPort, SubmissionReceipt};
pub use verification::VerificationCodePort;
pub use wizard_event::WizardEventPort;
