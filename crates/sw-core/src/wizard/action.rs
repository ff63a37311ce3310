use serde::{Deserialize, Serialize};

use crate::form::FormData;

/// Side effects requested by a transition. The state machine never performs
/// them itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardAction<S> {
    /// Run the asynchronous check of `step` against `data` and report back
    /// with `RemoteCheckCompleted { attempt, .. }`.
    RunRemoteCheck { step: S, attempt: u64, data: FormData },
    /// Stop the in-flight check of `attempt`; its result must not land.
    CancelRemoteCheck { attempt: u64 },
    /// Hand the full accumulated data to the submission collaborator.
    Submit { data: FormData },
}
