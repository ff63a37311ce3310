//! Adapters implementing the signup wizard ports.

pub mod checks;
pub mod events;
pub mod reference;
pub mod submission;
pub mod time;
pub mod verification;

pub use checks::InMemoryEmailDirectory;
pub use events::{BroadcastWizardEvents, TracingWizardEvents};
pub use reference::StaticReferenceData;
pub use submission::FileSubmissionOutbox;
pub use time::SystemClock;
pub use verification::InMemoryCodeSender;
