use async_trait::async_trait;
use tracing::{debug, info};

use sw_core::ports::WizardEventPort;
use sw_core::{FlowKind, StepKey, WizardPhase, WizardState};

/// Event port that only logs. Used when nothing renders the wizard, e.g. in
/// headless tests and batch imports.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWizardEvents;

#[async_trait]
impl<S: StepKey> WizardEventPort<S> for TracingWizardEvents {
    async fn emit_wizard_state_changed(&self, flow: FlowKind, state: WizardState<S>) {
        match &state.phase {
            WizardPhase::Exited(reason) => {
                info!(flow = %flow, step = %state.current_step, ?reason, "wizard exited");
            }
            phase => {
                debug!(
                    flow = %flow,
                    step = %state.current_step,
                    completed = state.completed_steps.len(),
                    ?phase,
                    last_error = state.last_error.as_deref().unwrap_or(""),
                    "wizard state changed"
                );
            }
        }
    }
}
