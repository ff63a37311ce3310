//! Human-facing progress derived from state and the current sequence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::step::{StepKey, StepRegistry};
use crate::wizard::WizardState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    /// Zero-based position of the current step in the sequence.
    pub index: usize,
    pub total: usize,
    pub percent: u8,
    pub step_labels: Vec<String>,
    pub completed_flags: Vec<bool>,
}

#[derive(Debug, Clone)]
pub struct ProgressReporter<S> {
    registry: Arc<StepRegistry<S>>,
}

impl<S: StepKey> ProgressReporter<S> {
    pub fn new(registry: Arc<StepRegistry<S>>) -> Self {
        Self { registry }
    }

    /// `sequence` must be the sequencer output for the state's current data;
    /// totals are never carried over from earlier points in the flow.
    pub fn report(&self, state: &WizardState<S>, sequence: &[S]) -> ProgressReport {
        let total = sequence.len();
        let index = self.index_of(state.current_step, sequence);
        let percent = if total == 0 {
            0
        } else {
            (100.0 * (index + 1) as f64 / total as f64).round() as u8
        };

        ProgressReport {
            index,
            total,
            percent,
            step_labels: sequence.iter().map(|step| self.registry.label(*step)).collect(),
            completed_flags: sequence
                .iter()
                .map(|step| state.is_completed(*step))
                .collect(),
        }
    }

    fn index_of(&self, current: S, sequence: &[S]) -> usize {
        if let Some(index) = sequence.iter().position(|step| *step == current) {
            return index;
        }
        // Not in the sequence: report the step the wizard would redirect to.
        let base = self.registry.position(current).unwrap_or(0);
        sequence
            .iter()
            .position(|step| self.registry.position(*step).unwrap_or(0) >= base)
            .unwrap_or(0)
    }
}
