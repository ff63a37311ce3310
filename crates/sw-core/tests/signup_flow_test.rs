//! Signup catalog driven through the pure state machine.

use serde_json::json;

use sw_core::flows::signup::{
    self, SignupStep, INTENT_AMBASSADOR, INTENT_SCHOLARSHIP, INTENT_SPONSOR,
};
use sw_core::{
    FormData, ProgressReporter, RegistryError, ValidationResult, WizardAction, WizardEvent,
    WizardPhase, WizardState, WizardStateMachine,
};

struct Harness {
    machine: WizardStateMachine<SignupStep>,
    reporter: ProgressReporter<SignupStep>,
    state: WizardState<SignupStep>,
}

impl Harness {
    fn new() -> Result<Self, RegistryError> {
        let registry = signup::registry()?;
        let machine = WizardStateMachine::new(registry.clone());
        let state = machine.initial_state();
        Ok(Self {
            machine,
            reporter: ProgressReporter::new(registry),
            state,
        })
    }

    fn send(&mut self, event: WizardEvent<SignupStep>) -> Vec<WizardAction<SignupStep>> {
        let (next, actions) = self.machine.transition(self.state.clone(), event);
        self.state = next;
        actions
    }

    /// Advance, answering a requested remote check with `Valid`.
    fn advance(&mut self, candidate: FormData) {
        let actions = self.send(WizardEvent::advance(candidate));
        for action in actions {
            if let WizardAction::RunRemoteCheck { attempt, .. } = action {
                self.send(WizardEvent::RemoteCheckCompleted {
                    attempt,
                    outcome: Ok(ValidationResult::Valid),
                });
            }
        }
    }

    fn sequence(&self) -> Vec<SignupStep> {
        self.machine.sequence(&self.state)
    }

    fn percent(&self) -> u8 {
        self.reporter.report(&self.state, &self.sequence()).percent
    }
}

fn personal_info() -> FormData {
    FormData::new()
        .with("firstName", "Ada")
        .with("lastName", "Lovelace")
        .with("email", "ada@example.org")
        .with("dateOfBirth", "1990-12-10")
        .with("country", "GB")
}

#[test]
fn account_type_reveals_personal_info() -> Result<(), RegistryError> {
    let mut wizard = Harness::new()?;
    assert_eq!(
        wizard.sequence(),
        vec![
            SignupStep::AccountType,
            SignupStep::IntentSelection,
            SignupStep::Verification,
            SignupStep::Completion,
        ]
    );

    wizard.advance(FormData::new().with("accountType", "Individual"));

    assert_eq!(
        wizard.sequence(),
        vec![
            SignupStep::AccountType,
            SignupStep::IntentSelection,
            SignupStep::PersonalInfo,
            SignupStep::Verification,
            SignupStep::Completion,
        ]
    );
    assert_eq!(wizard.state.current_step, SignupStep::IntentSelection);
    Ok(())
}

#[test]
fn empty_intents_are_rejected() -> Result<(), RegistryError> {
    let mut wizard = Harness::new()?;
    wizard.advance(FormData::new().with("accountType", "Individual"));
    let before = wizard.state.clone();

    wizard.advance(FormData::new().with("intents", json!([])));

    let validation = wizard.state.validation.clone().unwrap_or(ValidationResult::Valid);
    assert_eq!(
        validation.field_error("intents"),
        Some("Select at least one option")
    );
    assert_eq!(wizard.state.completed_steps, before.completed_steps);
    assert_eq!(wizard.state.current_step, SignupStep::IntentSelection);
    assert_eq!(wizard.state.data(), before.data());
    Ok(())
}

#[test]
fn exclusive_intents_are_rejected() -> Result<(), RegistryError> {
    let mut wizard = Harness::new()?;
    wizard.advance(FormData::new().with("accountType", "Individual"));
    let before = wizard.state.clone();

    wizard.advance(
        FormData::new().with("intents", json!([INTENT_SCHOLARSHIP, INTENT_SPONSOR])),
    );

    assert!(wizard.state.validation.as_ref().is_some_and(|v| !v.is_valid()));
    assert_eq!(wizard.state.current_step, before.current_step);
    assert_eq!(wizard.state.completed_steps, before.completed_steps);
    assert_eq!(wizard.state.data(), before.data());
    Ok(())
}

#[test]
fn switching_to_organization_clears_personal_fields() -> Result<(), RegistryError> {
    let mut wizard = Harness::new()?;
    wizard.advance(FormData::new().with("accountType", "Individual"));
    wizard.advance(FormData::new().with("intents", json!(["Donate"])));
    wizard.advance(personal_info());
    assert!(wizard.state.is_completed(SignupStep::PersonalInfo));
    assert_eq!(wizard.state.current_step, SignupStep::Verification);

    wizard.send(WizardEvent::Retreat);
    wizard.send(WizardEvent::Retreat);
    wizard.send(WizardEvent::Retreat);
    assert_eq!(wizard.state.current_step, SignupStep::AccountType);

    wizard.advance(FormData::new().with("accountType", "School"));

    let data = wizard.state.data();
    assert!(!data.contains("dateOfBirth"));
    assert!(!data.contains("firstName"));
    // Shared with organization-info, so it survives.
    assert_eq!(data.get_str("country"), Some("GB"));
    assert!(!wizard.state.is_completed(SignupStep::PersonalInfo));

    let sequence = wizard.sequence();
    assert!(!sequence.contains(&SignupStep::PersonalInfo));
    assert!(sequence.contains(&SignupStep::OrganizationInfo));
    Ok(())
}

#[test]
fn ambassador_intent_toggles_role_selection() -> Result<(), RegistryError> {
    let mut wizard = Harness::new()?;
    wizard.advance(FormData::new().with("accountType", "Corporate"));
    wizard.advance(FormData::new().with("intents", json!([INTENT_AMBASSADOR, "Donate"])));

    assert_eq!(
        wizard.sequence(),
        vec![
            SignupStep::AccountType,
            SignupStep::IntentSelection,
            SignupStep::OrganizationInfo,
            SignupStep::RoleSelection,
            SignupStep::Verification,
            SignupStep::Completion,
        ]
    );

    wizard.advance(
        FormData::new()
            .with("organizationName", "Northwind")
            .with("contactEmail", "csr@northwind.example")
            .with("country", "KE"),
    );
    assert_eq!(wizard.state.current_step, SignupStep::RoleSelection);

    wizard.send(WizardEvent::Amend {
        partial: FormData::new().with("intents", json!(["Donate"])),
    });

    assert!(!wizard.sequence().contains(&SignupStep::RoleSelection));
    assert_eq!(wizard.state.current_step, SignupStep::Verification);
    assert!(!wizard.state.data().contains("ambassadorRole"));
    assert_eq!(wizard.state.data().get_str_list("intents"), vec!["Donate"]);
    Ok(())
}

#[test]
fn retreat_then_advance_reproduces_data() -> Result<(), RegistryError> {
    let mut wizard = Harness::new()?;
    wizard.advance(FormData::new().with("accountType", "Individual"));
    let intents = FormData::new().with("intents", json!(["Mentor Students"]));
    wizard.advance(intents.clone());
    let committed = wizard.state.data().clone();

    wizard.send(WizardEvent::Retreat);
    wizard.advance(intents);

    assert_eq!(wizard.state.data(), &committed);
    assert_eq!(wizard.state.current_step, SignupStep::PersonalInfo);
    Ok(())
}

#[test]
fn progress_never_drops_across_successful_advances() -> Result<(), RegistryError> {
    let mut wizard = Harness::new()?;
    let candidates = [
        FormData::new().with("accountType", "Individual"),
        FormData::new().with("intents", json!([INTENT_AMBASSADOR])),
        personal_info(),
        FormData::new()
            .with("ambassadorRole", "Campus Ambassador")
            .with("motivation", "I run the robotics club"),
        FormData::new().with("verificationCode", "123456"),
    ];

    let mut last = wizard.percent();
    let mut last_total = wizard.sequence().len();
    for candidate in candidates {
        wizard.advance(candidate);
        let percent = wizard.percent();
        let total = wizard.sequence().len();
        assert!(percent >= last, "{percent} < {last}");
        if total == last_total {
            assert!(percent > last);
        }
        last = percent;
        last_total = total;
    }
    assert_eq!(wizard.state.current_step, SignupStep::Completion);
    assert_eq!(last, 100);
    Ok(())
}

#[test]
fn amended_intents_must_validate_before_submit() -> Result<(), RegistryError> {
    let mut wizard = Harness::new()?;
    wizard.advance(FormData::new().with("accountType", "Individual"));
    wizard.advance(FormData::new().with("intents", json!(["Donate"])));
    wizard.advance(personal_info());
    wizard.advance(FormData::new().with("verificationCode", "123456"));
    assert_eq!(wizard.state.current_step, SignupStep::Completion);

    wizard.send(WizardEvent::Amend {
        partial: FormData::new().with("intents", json!([INTENT_SCHOLARSHIP, INTENT_SPONSOR])),
    });
    assert!(!wizard.state.is_completed(SignupStep::IntentSelection));
    assert!(wizard.state.is_completed(SignupStep::PersonalInfo));

    let actions = wizard.send(WizardEvent::Submit);

    assert!(actions.is_empty());
    assert_eq!(wizard.state.phase, WizardPhase::Active);
    assert!(wizard
        .state
        .last_error
        .as_deref()
        .is_some_and(|e| e.contains("must be completed before submitting")));

    wizard.send(WizardEvent::JumpTo {
        step: SignupStep::IntentSelection,
    });
    assert_eq!(wizard.state.current_step, SignupStep::IntentSelection);
    Ok(())
}

#[test]
fn completed_steps_only_follow_valid_results() -> Result<(), RegistryError> {
    let mut wizard = Harness::new()?;
    wizard.advance(FormData::new().with("accountType", "Individual"));
    wizard.advance(FormData::new().with("intents", json!(["Donate"])));

    let actions = wizard.send(WizardEvent::advance(personal_info()));
    assert!(matches!(wizard.state.phase, WizardPhase::Validating { .. }));
    assert!(!wizard.state.is_completed(SignupStep::PersonalInfo));

    let attempt = match actions.as_slice() {
        [WizardAction::RunRemoteCheck { attempt, .. }] => *attempt,
        other => panic!("unexpected actions: {other:?}"),
    };
    wizard.send(WizardEvent::RemoteCheckCompleted {
        attempt,
        outcome: Ok(ValidationResult::field("email", "This email is already registered")),
    });

    assert!(!wizard.state.is_completed(SignupStep::PersonalInfo));
    assert_eq!(wizard.state.current_step, SignupStep::PersonalInfo);
    assert!(!wizard.state.data().contains("email"));
    assert_eq!(
        wizard.state.draft.as_ref().and_then(|d| d.get_str("email")),
        Some("ada@example.org")
    );
    Ok(())
}

#[test]
fn sequencing_is_deterministic() -> Result<(), RegistryError> {
    let wizard = Harness::new()?;
    let data = FormData::new()
        .with("accountType", "Government")
        .with("intents", json!([INTENT_AMBASSADOR]));
    let sequencer = wizard.machine.sequencer();
    let first = sequencer.sequence(&data);
    for _ in 0..10 {
        assert_eq!(sequencer.sequence(&data), first);
    }
    Ok(())
}
