//! Wizard state machine.
//!
//! Defines a pure state transition function for multi-step flows. Side effects
//! (remote checks, submission) are returned as actions for the caller to run.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::form::FormData;
use crate::step::{StepDefinition, StepKey, StepRegistry, StepSequencer};
use crate::validation::{ValidationResult, ValidatorFault};
use crate::wizard::{
    ExitReason, TransitionError, WizardAction, WizardEvent, WizardPhase, WizardState,
};

pub const DEFAULT_FAILURE_MESSAGE: &str =
    "Something went wrong while checking this step. Please try again.";
const INVALID_FALLBACK_MESSAGE: &str = "Please correct the highlighted fields.";

type Transition<S> = (WizardState<S>, Vec<WizardAction<S>>);

/// Pure wizard state machine over one flow's registry.
#[derive(Debug, Clone)]
pub struct WizardStateMachine<S> {
    sequencer: StepSequencer<S>,
    failure_message: String,
}

impl<S: StepKey> WizardStateMachine<S> {
    pub fn new(registry: Arc<StepRegistry<S>>) -> Self {
        Self {
            sequencer: StepSequencer::new(registry),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Message shown to the user when a validator faults.
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.trim().is_empty() {
            self.failure_message = message;
        }
        self
    }

    pub fn registry(&self) -> &StepRegistry<S> {
        self.sequencer.registry()
    }

    pub fn sequencer(&self) -> &StepSequencer<S> {
        &self.sequencer
    }

    pub fn initial_state(&self) -> WizardState<S> {
        let first = self.registry().first();
        let start = self
            .sequencer
            .resolve_current(first, &FormData::new())
            .unwrap_or(first);
        WizardState::new(start)
    }

    /// Applicable steps for the state's committed data.
    pub fn sequence(&self, state: &WizardState<S>) -> Vec<S> {
        self.sequencer.sequence(state.data())
    }

    pub fn transition(&self, state: WizardState<S>, event: WizardEvent<S>) -> Transition<S> {
        let phase = state.phase.clone();
        match (phase, event) {
            (_, WizardEvent::Reset) => self.reset(state),
            (
                WizardPhase::Validating { attempt },
                WizardEvent::RemoteCheckCompleted {
                    attempt: completed,
                    outcome,
                },
            ) if attempt == completed => self.finish_remote_check(state, outcome),
            (_, WizardEvent::RemoteCheckCompleted { attempt, .. }) => {
                debug!(attempt, "discarding stale remote check result");
                (state, Vec::new())
            }
            (WizardPhase::Exited(_), event) => self.reject(state, TransitionError::Exited, &event),

            (WizardPhase::Validating { attempt }, WizardEvent::Abandon) => {
                let (state, _) = self.exit(state, ExitReason::Abandoned);
                (state, vec![WizardAction::CancelRemoteCheck { attempt }])
            }
            (WizardPhase::Validating { .. }, event) => {
                let step = state.current_step.to_string();
                self.reject(state, TransitionError::ValidationPending { step }, &event)
            }

            (WizardPhase::Submitting, WizardEvent::SubmissionSucceeded { reference }) => {
                self.exit(state, ExitReason::Submitted { reference })
            }
            (WizardPhase::Submitting, WizardEvent::SubmissionFailed { reason }) => {
                let mut state = state;
                state.phase = WizardPhase::Active;
                state.last_error = Some(reason);
                (state, Vec::new())
            }
            (WizardPhase::Submitting, WizardEvent::Abandon) => {
                self.exit(state, ExitReason::Abandoned)
            }
            (WizardPhase::Submitting, event) => {
                self.reject(state, TransitionError::SubmissionInProgress, &event)
            }

            (WizardPhase::Active, WizardEvent::Advance { candidate, expected }) => {
                self.advance(state, candidate, expected)
            }
            (WizardPhase::Active, WizardEvent::Retreat) => self.retreat(state),
            (WizardPhase::Active, WizardEvent::JumpTo { step }) => self.jump_to(state, step),
            (WizardPhase::Active, WizardEvent::Amend { partial }) => self.amend(state, partial),
            (WizardPhase::Active, WizardEvent::Submit) => self.submit(state),
            (WizardPhase::Active, WizardEvent::Abandon) => self.exit(state, ExitReason::Abandoned),
            (
                WizardPhase::Active,
                event @ (WizardEvent::SubmissionSucceeded { .. }
                | WizardEvent::SubmissionFailed { .. }),
            ) => {
                debug!(event = event.name(), "ignoring submission result outside submitting");
                (state, Vec::new())
            }
        }
    }

    fn advance(
        &self,
        state: WizardState<S>,
        candidate: FormData,
        expected: Option<S>,
    ) -> Transition<S> {
        let current = state.current_step;
        let event_name = "advance";
        if let Some(expected) = expected.filter(|expected| *expected != current) {
            let error = TransitionError::StaleStep {
                expected: expected.to_string(),
                current: current.to_string(),
            };
            return self.reject_named(state, error, event_name);
        }
        let Some(step) = self.registry().get(current) else {
            return self.reject_named(state, TransitionError::NoApplicableStep, event_name);
        };
        if step.is_terminal() {
            let error = TransitionError::TerminalStep {
                step: current.to_string(),
            };
            return self.reject_named(state, error, event_name);
        }

        let merged = state.data().merged_with(&candidate);
        match step.validate(&merged) {
            Err(fault) => self.fault(state, fault),
            Ok(result @ ValidationResult::Invalid { .. }) => {
                self.record_invalid(state, candidate, result)
            }
            Ok(ValidationResult::Valid) if step.requires_remote_check() => {
                let mut state = state;
                state.attempts += 1;
                let attempt = state.attempts;
                state.phase = WizardPhase::Validating { attempt };
                state.draft = Some(candidate);
                state.validation = None;
                state.last_error = None;
                debug!(step = %current, attempt, "local validation passed, awaiting remote check");
                (
                    state,
                    vec![WizardAction::RunRemoteCheck {
                        step: current,
                        attempt,
                        data: merged,
                    }],
                )
            }
            Ok(ValidationResult::Valid) => self.commit(state, candidate),
        }
    }

    fn finish_remote_check(
        &self,
        state: WizardState<S>,
        outcome: Result<ValidationResult, ValidatorFault>,
    ) -> Transition<S> {
        let mut state = state;
        state.phase = WizardPhase::Active;
        let candidate = state.draft.take().unwrap_or_default();
        match outcome {
            Ok(ValidationResult::Valid) => self.commit(state, candidate),
            Ok(result) => self.record_invalid(state, candidate, result),
            Err(fault) => {
                state.draft = Some(candidate);
                self.fault(state, fault)
            }
        }
    }

    /// Merge a validated candidate, apply branch invalidation, mark the step
    /// completed and move to the next applicable step.
    fn commit(&self, state: WizardState<S>, candidate: FormData) -> Transition<S> {
        let mut state = state;
        let completed = state.current_step;
        self.merge_with_invalidation(&mut state, &candidate);
        state.completed_steps.insert(completed);
        state.clear_feedback();

        let next = self
            .sequencer
            .next_after(completed, state.data())
            .or_else(|| self.sequencer.resolve_current(completed, state.data()));
        if let Some(next) = next {
            state.current_step = next;
        }
        debug!(completed = %completed, current = %state.current_step, "step committed");
        (state, Vec::new())
    }

    fn retreat(&self, state: WizardState<S>) -> Transition<S> {
        let mut state = state;
        let current = state.current_step;
        match self.sequencer.previous_before(current, state.data()) {
            Some(previous) => {
                state.current_step = previous;
                state.clear_feedback();
                (state, Vec::new())
            }
            None => {
                let error = TransitionError::FirstStep {
                    step: current.to_string(),
                };
                self.reject_named(state, error, "retreat")
            }
        }
    }

    fn jump_to(&self, state: WizardState<S>, target: S) -> Transition<S> {
        let data = state.data();
        let reachable = self.sequencer.contains(target, data)
            && (target == state.current_step
                || state.is_completed(target)
                || self.frontier(&state) == Some(target));
        if !reachable {
            let error = TransitionError::JumpNotAllowed {
                target: target.to_string(),
            };
            return self.reject_named(state, error, "jump_to");
        }
        let mut state = state;
        if state.current_step != target {
            state.current_step = target;
            state.clear_feedback();
        }
        (state, Vec::new())
    }

    fn amend(&self, state: WizardState<S>, partial: FormData) -> Transition<S> {
        let mut state = state;
        let current = state.current_step;
        self.merge_with_invalidation(&mut state, &partial);
        // Edited data has not been through the validator yet.
        state.completed_steps.remove(&current);
        let stale = self.stale_owners(&state, &partial);
        if !stale.is_empty() {
            debug!(steps = ?stale, "amended fields reopened completed steps");
            for step in &stale {
                state.completed_steps.remove(step);
            }
        }

        if !self.sequencer.contains(current, state.data()) {
            match self.sequencer.resolve_current(current, state.data()) {
                Some(redirect) => {
                    debug!(from = %current, to = %redirect, "current step no longer applies");
                    state.current_step = redirect;
                    state.clear_feedback();
                }
                None => {
                    return self.reject_named(state, TransitionError::NoApplicableStep, "amend");
                }
            }
        }
        (state, Vec::new())
    }

    fn submit(&self, state: WizardState<S>) -> Transition<S> {
        let current = state.current_step;
        if !self.registry().is_terminal(current) {
            return self.reject_named(state, TransitionError::NotAtTerminal, "submit");
        }
        let missing = self
            .sequencer
            .sequence(state.data())
            .into_iter()
            .find(|step| *step != current && !state.is_completed(*step));
        if let Some(step) = missing {
            let error = TransitionError::IncompleteStep {
                step: step.to_string(),
            };
            return self.reject_named(state, error, "submit");
        }

        // Completed steps are checked again against the data being sent.
        for step in self.sequencer.sequence(state.data()) {
            let Some(definition) = self.registry().get(step).filter(|_| state.is_completed(step))
            else {
                continue;
            };
            match definition.validate(state.data()) {
                Ok(result) if result.is_valid() => {}
                Ok(result) => {
                    debug!(step = %step, ?result, "completed step no longer validates");
                    let mut state = state;
                    state.completed_steps.remove(&step);
                    let error = TransitionError::IncompleteStep {
                        step: step.to_string(),
                    };
                    return self.reject_named(state, error, "submit");
                }
                Err(fault) => return self.fault(state, fault),
            }
        }

        let mut state = state;
        state.phase = WizardPhase::Submitting;
        state.last_error = None;
        let data = state.data().clone();
        (state, vec![WizardAction::Submit { data }])
    }

    fn reset(&self, state: WizardState<S>) -> Transition<S> {
        let mut actions = Vec::new();
        if let WizardPhase::Validating { attempt } = state.phase {
            actions.push(WizardAction::CancelRemoteCheck { attempt });
        }
        let mut fresh = self.initial_state();
        // Attempt ids keep increasing so a result from before the reset never
        // matches a later check.
        fresh.attempts = state.attempts;
        (fresh, actions)
    }

    fn exit(&self, state: WizardState<S>, reason: ExitReason) -> Transition<S> {
        let mut state = state;
        state.phase = WizardPhase::Exited(reason);
        state.draft = None;
        state.validation = None;
        (state, Vec::new())
    }

    /// First applicable step not yet completed. Every step before it is
    /// completed, so it is the furthest point a jump may reach.
    fn frontier(&self, state: &WizardState<S>) -> Option<S> {
        self.sequencer
            .sequence(state.data())
            .into_iter()
            .find(|step| !state.is_completed(*step))
    }

    /// Completed steps owning a key of `partial` whose mark no longer holds:
    /// remote-checked owners always, the rest when their validator stops
    /// accepting the merged data.
    fn stale_owners(&self, state: &WizardState<S>, partial: &FormData) -> Vec<S> {
        self.registry()
            .iter()
            .filter(|definition| state.is_completed(definition.id()))
            .filter(|definition| {
                definition
                    .owned_fields()
                    .iter()
                    .any(|field| partial.contains(field))
            })
            .filter(|definition| {
                definition.requires_remote_check()
                    || !matches!(definition.validate(state.data()), Ok(result) if result.is_valid())
            })
            .map(StepDefinition::id)
            .collect()
    }

    /// Shallow-merge `partial` and, when a branch field changed, clear the
    /// fields and completion marks of steps that stopped applying.
    fn merge_with_invalidation(&self, state: &mut WizardState<S>, partial: &FormData) {
        let before = state.data().clone();
        state.data.update(partial);

        let branch_changed = self
            .registry()
            .branch_fields()
            .iter()
            .any(|field| before.get(field) != state.data().get(field));
        if !branch_changed {
            return;
        }

        let dropped = self.sequencer.dropped_steps(&before, state.data());
        if dropped.is_empty() {
            return;
        }
        let orphaned = self.sequencer.orphaned_fields(&dropped, state.data());
        let cleared = state.data.invalidate_branch(&orphaned);
        for step in &dropped {
            state.completed_steps.remove(step);
        }
        debug!(dropped = ?dropped, cleared = ?cleared, "branch change invalidated steps");
    }

    fn record_invalid(
        &self,
        state: WizardState<S>,
        candidate: FormData,
        result: ValidationResult,
    ) -> Transition<S> {
        let mut state = state;
        let message = result
            .form_error()
            .unwrap_or(INVALID_FALLBACK_MESSAGE)
            .to_string();
        debug!(step = %state.current_step, ?result, "step validation failed");
        state.draft = Some(candidate);
        state.validation = Some(result);
        state.last_error = Some(message);
        (state, Vec::new())
    }

    fn fault(&self, state: WizardState<S>, fault: ValidatorFault) -> Transition<S> {
        let mut state = state;
        let error = TransitionError::ValidatorFault {
            step: state.current_step.to_string(),
            reason: fault.message,
        };
        warn!(error = %error, "wizard transition failed");
        state.last_error = Some(self.failure_message.clone());
        (state, Vec::new())
    }

    fn reject(
        &self,
        state: WizardState<S>,
        error: TransitionError,
        event: &WizardEvent<S>,
    ) -> Transition<S> {
        self.reject_named(state, error, event.name())
    }

    fn reject_named(
        &self,
        state: WizardState<S>,
        error: TransitionError,
        event: &str,
    ) -> Transition<S> {
        let mut state = state;
        warn!(event, step = %state.current_step, error = %error, "wizard transition rejected");
        state.last_error = Some(error.to_string());
        (state, Vec::new())
    }
}
