//! Wizard orchestrator.
//!
//! Drives one wizard session: feeds events to the pure state machine, runs the
//! actions it returns (remote checks, submission) and publishes every state
//! change through the event port.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::{watch, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use sw_core::ports::{RemoteCheckPort, SubmissionPort, WizardEventPort};
use sw_core::{
    FlowKind, FormData, ProgressReport, ProgressReporter, StepKey, StepPayload, StepRegistry,
    ValidationResult, ValidatorFault, WizardAction, WizardEvent, WizardState,
    WizardStateMachine,
};

use crate::usecases::wizard::context::WizardContext;

pub const DEFAULT_REMOTE_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors produced by the wizard orchestrator.
///
/// Transition failures are not errors here: they land in
/// `WizardState::last_error` so the step can show them.
#[derive(Debug, thiserror::Error)]
pub enum WizardOrchestratorError {
    #[error("failed to encode step payload: {0}")]
    EncodePayload(#[from] serde_json::Error),
}

struct PendingCheck {
    attempt: u64,
    abort: AbortHandle,
    /// Flips to `true` once the result went through dispatch. A dropped sender
    /// means the task was aborted.
    done: watch::Receiver<bool>,
}

struct Shared<S: StepKey> {
    flow: FlowKind,
    context: Arc<WizardContext<S>>,
    machine: WizardStateMachine<S>,
    reporter: ProgressReporter<S>,
    submission: Arc<dyn SubmissionPort>,
    event_port: Arc<dyn WizardEventPort<S>>,
    remote_checks: HashMap<S, Arc<dyn RemoteCheckPort>>,
    remote_check_timeout: Duration,
    pending_check: Mutex<Option<PendingCheck>>,
}

/// Orchestrator that drives wizard state and side effects.
///
/// Clones share the same session.
pub struct WizardOrchestrator<S: StepKey> {
    shared: Arc<Shared<S>>,
}

impl<S: StepKey> Clone for WizardOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: StepKey> WizardOrchestrator<S> {
    pub fn builder(flow: FlowKind, registry: Arc<StepRegistry<S>>) -> WizardOrchestratorBuilder<S> {
        WizardOrchestratorBuilder::new(flow, registry)
    }

    pub fn flow(&self) -> FlowKind {
        self.shared.flow
    }

    pub async fn advance(&self, candidate: FormData) -> Result<WizardState<S>, WizardOrchestratorError> {
        let event = WizardEvent::advance(candidate);
        Ok(self.shared.dispatch(event).await)
    }

    /// Advance with a typed payload. The payload's step must still be the
    /// current one, otherwise the transition is rejected as stale.
    pub async fn advance_with<P>(&self, payload: &P) -> Result<WizardState<S>, WizardOrchestratorError>
    where
        P: StepPayload<Step = S>,
    {
        let event = WizardEvent::Advance {
            candidate: payload.to_partial()?,
            expected: Some(payload.step()),
        };
        Ok(self.shared.dispatch(event).await)
    }

    pub async fn retreat(&self) -> Result<WizardState<S>, WizardOrchestratorError> {
        Ok(self.shared.dispatch(WizardEvent::Retreat).await)
    }

    pub async fn jump_to(&self, step: S) -> Result<WizardState<S>, WizardOrchestratorError> {
        Ok(self.shared.dispatch(WizardEvent::JumpTo { step }).await)
    }

    /// Live edit of committed data, e.g. a multi-select toggled on screen.
    pub async fn amend(&self, partial: FormData) -> Result<WizardState<S>, WizardOrchestratorError> {
        Ok(self.shared.dispatch(WizardEvent::Amend { partial }).await)
    }

    pub async fn submit(&self) -> Result<WizardState<S>, WizardOrchestratorError> {
        Ok(self.shared.dispatch(WizardEvent::Submit).await)
    }

    /// Tear the session down. A pending remote check is cancelled.
    pub async fn abandon(&self) -> Result<WizardState<S>, WizardOrchestratorError> {
        Ok(self.shared.dispatch(WizardEvent::Abandon).await)
    }

    pub async fn reset(&self) -> Result<WizardState<S>, WizardOrchestratorError> {
        Ok(self.shared.dispatch(WizardEvent::Reset).await)
    }

    pub async fn get_state(&self) -> WizardState<S> {
        self.shared.context.get_state().await
    }

    pub async fn sequence(&self) -> Vec<S> {
        let state = self.get_state().await;
        self.shared.machine.sequence(&state)
    }

    pub async fn progress(&self) -> ProgressReport {
        let state = self.get_state().await;
        let sequence = self.shared.machine.sequence(&state);
        self.shared.reporter.report(&state, &sequence)
    }

    /// Resolves once the in-flight remote check (if any) has landed or was
    /// cancelled, and returns the state at that point.
    pub async fn wait_for_pending_check(&self) -> WizardState<S> {
        let done = self
            .shared
            .pending_check
            .lock()
            .await
            .as_ref()
            .map(|pending| pending.done.clone());
        if let Some(mut done) = done {
            // Err means the sender is gone: the task was aborted.
            let _ = done.wait_for(|finished| *finished).await;
        }
        self.get_state().await
    }
}

impl<S: StepKey> Shared<S> {
    async fn dispatch(self: &Arc<Self>, event: WizardEvent<S>) -> WizardState<S> {
        // Serializes transitions: two events never start from the same state.
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;

        let span = info_span!(
            "usecase.wizard_orchestrator.dispatch",
            flow = %self.flow,
            event = event.name()
        );
        async {
            let mut current = self.context.get_state().await;
            let mut pending_events = vec![event];

            while let Some(event) = pending_events.pop() {
                let from = current.current_step;
                let event_name = event.name();
                let (next, actions) = self.machine.transition(current, event);
                info!(
                    event = event_name,
                    from = %from,
                    to = %next.current_step,
                    phase = ?next.phase,
                    "wizard state transition"
                );
                self.set_state_and_emit(next.clone()).await;
                current = next;
                pending_events.extend(self.execute_actions(actions).await);
            }

            current
        }
        .instrument(span)
        .await
    }

    async fn execute_actions(self: &Arc<Self>, actions: Vec<WizardAction<S>>) -> Vec<WizardEvent<S>> {
        let mut follow_up_events = Vec::new();
        for action in actions {
            match action {
                WizardAction::RunRemoteCheck { step, attempt, data } => {
                    self.start_remote_check(step, attempt, data).await;
                }
                WizardAction::CancelRemoteCheck { attempt } => {
                    self.cancel_remote_check(attempt).await;
                }
                WizardAction::Submit { data } => {
                    follow_up_events.push(self.submit(&data).await);
                }
            }
        }
        follow_up_events
    }

    async fn set_state_and_emit(&self, state: WizardState<S>) {
        self.context.set_state(state.clone()).await;
        self.event_port
            .emit_wizard_state_changed(self.flow, state)
            .await;
    }

    async fn start_remote_check(self: &Arc<Self>, step: S, attempt: u64, data: FormData) {
        let port = self.remote_checks.get(&step).cloned();
        let (done_tx, done_rx) = watch::channel(false);
        let task = remote_check_task(
            Arc::downgrade(self),
            port,
            step,
            attempt,
            data,
            self.remote_check_timeout,
            done_tx,
        );
        let handle = tokio::spawn(task);

        let mut pending = self.pending_check.lock().await;
        let previous = pending.replace(PendingCheck {
            attempt,
            abort: handle.abort_handle(),
            done: done_rx,
        });
        if let Some(previous) = previous {
            previous.abort.abort();
        }
        debug!(step = %step, attempt, "remote check started");
    }

    async fn cancel_remote_check(&self, attempt: u64) {
        let mut pending = self.pending_check.lock().await;
        if pending.as_ref().is_some_and(|p| p.attempt == attempt) {
            if let Some(cancelled) = pending.take() {
                cancelled.abort.abort();
                debug!(attempt, "remote check cancelled");
            }
        }
    }

    async fn clear_pending(&self, attempt: u64) {
        let mut pending = self.pending_check.lock().await;
        if pending.as_ref().is_some_and(|p| p.attempt == attempt) {
            pending.take();
        }
    }

    async fn submit(&self, data: &FormData) -> WizardEvent<S> {
        match self.submission.submit(self.flow, data).await {
            Ok(receipt) => {
                info!(
                    flow = %self.flow,
                    reference = %receipt.reference,
                    "wizard submission accepted"
                );
                WizardEvent::SubmissionSucceeded {
                    reference: Some(receipt.reference),
                }
            }
            Err(err) => {
                error!(flow = %self.flow, error = %err, "wizard submission failed");
                WizardEvent::SubmissionFailed {
                    reason: err.to_string(),
                }
            }
        }
    }
}

impl<S: StepKey> Drop for Shared<S> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending_check.get_mut().take() {
            debug!(attempt = pending.attempt, "wizard dropped with a pending remote check");
            pending.abort.abort();
        }
    }
}

/// Boxed so the task type does not depend on `dispatch`, which spawns it.
fn remote_check_task<S: StepKey>(
    shared: Weak<Shared<S>>,
    port: Option<Arc<dyn RemoteCheckPort>>,
    step: S,
    attempt: u64,
    data: FormData,
    limit: Duration,
    done: watch::Sender<bool>,
) -> BoxFuture<'static, ()> {
    async move {
        let outcome = run_remote_check(port, step, &data, limit).await;
        let Some(shared) = shared.upgrade() else {
            debug!(step = %step, attempt, "wizard gone before remote check finished");
            return;
        };
        shared
            .dispatch(WizardEvent::RemoteCheckCompleted { attempt, outcome })
            .await;
        shared.clear_pending(attempt).await;
        done.send_replace(true);
    }
    .boxed()
}

async fn run_remote_check<S: StepKey>(
    port: Option<Arc<dyn RemoteCheckPort>>,
    step: S,
    data: &FormData,
    limit: Duration,
) -> Result<ValidationResult, ValidatorFault> {
    let Some(port) = port else {
        warn!(step = %step, "no remote check registered");
        return Err(ValidatorFault::new(format!(
            "no remote check registered for step {step}"
        )));
    };
    match tokio::time::timeout(limit, port.check(data)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            let limit_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            warn!(step = %step, limit_ms, "remote check timed out");
            Err(ValidatorFault::new(format!(
                "remote check timed out after {limit_ms} ms"
            )))
        }
    }
}

/// Builder for a [`WizardOrchestrator`].
pub struct WizardOrchestratorBuilder<S: StepKey> {
    flow: FlowKind,
    registry: Arc<StepRegistry<S>>,
    submission: Option<Arc<dyn SubmissionPort>>,
    event_port: Option<Arc<dyn WizardEventPort<S>>>,
    remote_checks: HashMap<S, Arc<dyn RemoteCheckPort>>,
    remote_check_timeout: Duration,
    failure_message: Option<String>,
}

impl<S: StepKey> WizardOrchestratorBuilder<S> {
    pub fn new(flow: FlowKind, registry: Arc<StepRegistry<S>>) -> Self {
        Self {
            flow,
            registry,
            submission: None,
            event_port: None,
            remote_checks: HashMap::new(),
            remote_check_timeout: DEFAULT_REMOTE_CHECK_TIMEOUT,
            failure_message: None,
        }
    }

    pub fn with_submission(mut self, submission: Arc<dyn SubmissionPort>) -> Self {
        self.submission = Some(submission);
        self
    }

    pub fn with_event_port(mut self, event_port: Arc<dyn WizardEventPort<S>>) -> Self {
        self.event_port = Some(event_port);
        self
    }

    pub fn with_remote_check(mut self, step: S, check: Arc<dyn RemoteCheckPort>) -> Self {
        self.remote_checks.insert(step, check);
        self
    }

    pub fn with_remote_check_timeout(mut self, timeout: Duration) -> Self {
        self.remote_check_timeout = timeout;
        self
    }

    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    pub fn build(self) -> anyhow::Result<WizardOrchestrator<S>> {
        let submission = self
            .submission
            .ok_or_else(|| anyhow::anyhow!("SubmissionPort is required"))?;
        let event_port = self
            .event_port
            .ok_or_else(|| anyhow::anyhow!("WizardEventPort is required"))?;

        let mut machine = WizardStateMachine::new(Arc::clone(&self.registry));
        if let Some(message) = self.failure_message {
            machine = machine.with_failure_message(message);
        }
        for step in self.registry.iter() {
            if step.requires_remote_check() && !self.remote_checks.contains_key(&step.id()) {
                warn!(
                    flow = %self.flow,
                    step = %step.id(),
                    "step requests a remote check but none is registered"
                );
            }
        }
        let initial_state = machine.initial_state();

        Ok(WizardOrchestrator {
            shared: Arc::new(Shared {
                flow: self.flow,
                context: WizardContext::new(initial_state).arc(),
                reporter: ProgressReporter::new(self.registry),
                machine,
                submission,
                event_port,
                remote_checks: self.remote_checks,
                remote_check_timeout: self.remote_check_timeout,
                pending_check: Mutex::new(None),
            }),
        })
    }
}
