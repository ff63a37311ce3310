//! Wizard state observers.

mod broadcast;
mod tracing_events;

pub use broadcast::{BroadcastWizardEvents, WizardStateChanged};
pub use tracing_events::TracingWizardEvents;
