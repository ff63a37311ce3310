use std::sync::Arc;

use tokio::sync::Mutex;
use sw_core::{StepKey, WizardState};

/// State of one wizard session plus the lock that serializes dispatch.
///
/// ## Lock Ordering
/// When acquiring both locks, acquire `dispatch_lock` first, then `state`.
/// - `dispatch_lock`: held for a whole transition, including the actions it
///   runs, so two events never read the same state.
/// - `state`: taken briefly by readers (`get_state`) and by dispatch to store
///   the next state.
pub struct WizardContext<S: StepKey> {
    state: Mutex<WizardState<S>>,
    dispatch_lock: Mutex<()>,
}

impl<S: StepKey> WizardContext<S> {
    pub fn new(initial_state: WizardState<S>) -> Self {
        Self {
            state: Mutex::new(initial_state),
            dispatch_lock: Mutex::new(()),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Does NOT acquire `dispatch_lock`.
    pub async fn get_state(&self) -> WizardState<S> {
        self.state.lock().await.clone()
    }

    pub async fn acquire_dispatch_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.dispatch_lock.lock().await
    }

    /// Only call while holding `dispatch_lock`.
    pub async fn set_state(&self, state: WizardState<S>) {
        let mut guard = self.state.lock().await;
        *guard = state;
    }
}
