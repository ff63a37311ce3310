//! Fan-out of wizard state changes to any number of subscribers (a UI bridge,
//! an analytics sink). Slow subscribers lose the oldest states, never block
//! the wizard.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use sw_core::ports::WizardEventPort;
use sw_core::{FlowKind, StepKey, WizardState};

pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardStateChanged<S: StepKey + Serialize> {
    pub flow: FlowKind,
    pub state: WizardState<S>,
}

pub struct BroadcastWizardEvents<S: StepKey + Serialize> {
    sender: broadcast::Sender<WizardStateChanged<S>>,
}

impl<S: StepKey + Serialize> BroadcastWizardEvents<S> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WizardStateChanged<S>> {
        self.sender.subscribe()
    }
}

impl<S: StepKey + Serialize> Default for BroadcastWizardEvents<S> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl<S: StepKey + Serialize> WizardEventPort<S> for BroadcastWizardEvents<S> {
    async fn emit_wizard_state_changed(&self, flow: FlowKind, state: WizardState<S>) {
        // No subscribers is fine.
        if self.sender.send(WizardStateChanged { flow, state }).is_err() {
            trace!(flow = %flow, "wizard state change had no subscribers");
        }
    }
}
