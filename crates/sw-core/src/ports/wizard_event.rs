use async_trait::async_trait;

use crate::flows::FlowKind;
use crate::step::StepKey;
use crate::wizard::WizardState;

/// Observers of wizard state (renderers, diagnostics).
#[async_trait]
pub trait WizardEventPort<S: StepKey>: Send + Sync {
    async fn emit_wizard_state_changed(&self, flow: FlowKind, state: WizardState<S>);
}
