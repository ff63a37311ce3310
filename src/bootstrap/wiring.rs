//! # Dependency Injection
//!
//! Builds the infra adapters once per process and assembles wizard sessions
//! from them. The only place that depends on `sw-app` and `sw-infra` together.
//!
//! No business logic lives here. `None` config facts are turned into the
//! adapters' defaults and nothing else is decided.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use sw_app::usecases::{
    CheckVerificationCode, ListReferenceChoices, RequestVerificationCode, WizardOrchestrator,
};
use sw_core::flows::judge::{self, JudgeStep};
use sw_core::flows::signup::{self, SignupStep};
use sw_core::flows::sponsor::{self, SponsorStep};
use sw_core::flows::verification::VerificationTimer;
use sw_core::ports::{ClockPort, RemoteCheckPort, SubmissionPort, WizardEventPort};
use sw_core::{FlowKind, RegistryError, StepKey, StepRegistry, WizardConfig};
use sw_infra::events::WizardStateChanged;
use sw_infra::{
    BroadcastWizardEvents, FileSubmissionOutbox, InMemoryCodeSender, InMemoryEmailDirectory,
    StaticReferenceData, SystemClock, TracingWizardEvents,
};

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors while assembling adapters or sessions.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("No local data directory on this platform; set [submission] outbox_dir")]
    DataDirUnavailable,

    #[error("Reference data initialization failed: {0}")]
    ReferenceDataInit(String),

    #[error("Flow catalog is invalid: {0}")]
    Catalog(#[from] RegistryError),

    #[error("Wizard initialization failed: {0}")]
    WizardInit(String),
}

/// Per-user data directory, e.g. `~/.local/share/signup-wizard` on Linux.
pub fn default_data_dir() -> WiringResult<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join("signup-wizard"))
        .ok_or(WiringError::DataDirUnavailable)
}

/// How state changes leave a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDelivery {
    /// Fan out to subscribers (a renderer bridge).
    Broadcast,
    /// Log only, for headless runs.
    LogOnly,
}

/// Event port for one flow plus the handle subscribers attach to.
struct FlowEvents<S: StepKey + Serialize> {
    broadcast: Option<Arc<BroadcastWizardEvents<S>>>,
}

impl<S: StepKey + Serialize> FlowEvents<S> {
    fn new(delivery: EventDelivery) -> Self {
        let broadcast = match delivery {
            EventDelivery::Broadcast => Some(Arc::new(BroadcastWizardEvents::default())),
            EventDelivery::LogOnly => None,
        };
        Self { broadcast }
    }

    fn port(&self) -> Arc<dyn WizardEventPort<S>> {
        match &self.broadcast {
            Some(broadcast) => broadcast.clone(),
            None => Arc::new(TracingWizardEvents),
        }
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<WizardStateChanged<S>>> {
        self.broadcast.as_ref().map(|b| b.subscribe())
    }
}

/// Adapters shared by every session of the process.
pub struct WizardRuntime {
    submission: Arc<FileSubmissionOutbox>,
    email_directory: Arc<InMemoryEmailDirectory>,
    reference_data: Arc<StaticReferenceData>,
    request_code: Arc<RequestVerificationCode>,
    code_sender: Arc<InMemoryCodeSender>,
    remote_check_timeout: Option<Duration>,
    failure_message: Option<String>,
    signup_events: FlowEvents<SignupStep>,
    sponsor_events: FlowEvents<SponsorStep>,
    judge_events: FlowEvents<JudgeStep>,
}

impl WizardRuntime {
    /// Wire adapters from a loaded config.
    ///
    /// # Errors
    ///
    /// - `DataDirUnavailable` when no outbox is configured and the platform
    ///   has no data directory
    /// - `ReferenceDataInit` when the bundled reference table does not parse
    pub fn wire(config: &WizardConfig, delivery: EventDelivery) -> WiringResult<Self> {
        let outbox_dir = match &config.outbox_dir {
            Some(dir) => dir.clone(),
            None => WizardConfig::with_defaults(default_data_dir()?)
                .outbox_dir
                .ok_or(WiringError::DataDirUnavailable)?,
        };
        let submission = Arc::new(FileSubmissionOutbox::new(outbox_dir));

        let reference_data = Arc::new(
            StaticReferenceData::bundled()
                .map_err(|e| WiringError::ReferenceDataInit(e.to_string()))?,
        );

        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
        let code_sender = Arc::new(InMemoryCodeSender::new());
        let request_code = Arc::new(RequestVerificationCode::new(
            clock,
            code_sender.clone(),
            VerificationTimer::from_config(config),
        ));

        info!(
            outbox = %submission.outbox_dir().display(),
            ?delivery,
            "wizard runtime wired"
        );

        Ok(Self {
            submission,
            email_directory: Arc::new(InMemoryEmailDirectory::new()),
            reference_data,
            request_code,
            code_sender,
            remote_check_timeout: config.remote_check_timeout_ms.map(Duration::from_millis),
            failure_message: config.failure_message.clone(),
            signup_events: FlowEvents::new(delivery),
            sponsor_events: FlowEvents::new(delivery),
            judge_events: FlowEvents::new(delivery),
        })
    }

    /// A fresh signup session. Email availability is checked on personal info
    /// and the typed code against the last one sent on verification.
    pub fn signup_wizard(&self) -> WiringResult<WizardOrchestrator<SignupStep>> {
        let email_check: Arc<dyn RemoteCheckPort> = self.email_directory.clone();
        let code_check: Arc<dyn RemoteCheckPort> =
            Arc::new(CheckVerificationCode::new(self.request_code.clone()));
        self.build_wizard(
            FlowKind::Signup,
            signup::registry()?,
            self.signup_events.port(),
            vec![
                (SignupStep::PersonalInfo, email_check),
                (SignupStep::Verification, code_check),
            ],
        )
    }

    pub fn sponsor_wizard(&self) -> WiringResult<WizardOrchestrator<SponsorStep>> {
        self.build_wizard(
            FlowKind::Sponsor,
            sponsor::registry()?,
            self.sponsor_events.port(),
            Vec::new(),
        )
    }

    pub fn judge_wizard(&self) -> WiringResult<WizardOrchestrator<JudgeStep>> {
        self.build_wizard(
            FlowKind::Judge,
            judge::registry()?,
            self.judge_events.port(),
            Vec::new(),
        )
    }

    /// `None` when wired with [`EventDelivery::LogOnly`].
    pub fn subscribe_signup(&self) -> Option<broadcast::Receiver<WizardStateChanged<SignupStep>>> {
        self.signup_events.subscribe()
    }

    pub fn subscribe_sponsor(
        &self,
    ) -> Option<broadcast::Receiver<WizardStateChanged<SponsorStep>>> {
        self.sponsor_events.subscribe()
    }

    pub fn subscribe_judge(&self) -> Option<broadcast::Receiver<WizardStateChanged<JudgeStep>>> {
        self.judge_events.subscribe()
    }

    pub fn list_reference_choices(&self) -> ListReferenceChoices {
        ListReferenceChoices::new(self.reference_data.clone())
    }

    /// Shared so the resend cooldown holds across calls.
    pub fn request_verification_code(&self) -> Arc<RequestVerificationCode> {
        self.request_code.clone()
    }

    pub fn submission_outbox(&self) -> &FileSubmissionOutbox {
        &self.submission
    }

    pub fn email_directory(&self) -> &InMemoryEmailDirectory {
        &self.email_directory
    }

    pub fn code_sender(&self) -> &InMemoryCodeSender {
        &self.code_sender
    }

    fn build_wizard<S: StepKey>(
        &self,
        flow: FlowKind,
        registry: Arc<StepRegistry<S>>,
        events: Arc<dyn WizardEventPort<S>>,
        remote_checks: Vec<(S, Arc<dyn RemoteCheckPort>)>,
    ) -> WiringResult<WizardOrchestrator<S>> {
        let submission: Arc<dyn SubmissionPort> = self.submission.clone();
        let mut builder = WizardOrchestrator::builder(flow, registry)
            .with_submission(submission)
            .with_event_port(events);

        for (step, check) in remote_checks {
            builder = builder.with_remote_check(step, check);
        }
        if let Some(timeout) = self.remote_check_timeout {
            builder = builder.with_remote_check_timeout(timeout);
        }
        if let Some(message) = &self.failure_message {
            builder = builder.with_failure_message(message.clone());
        }

        let wizard = builder
            .build()
            .map_err(|e| WiringError::WizardInit(e.to_string()))?;
        debug!(flow = %flow, "wizard session created");
        Ok(wizard)
    }
}
