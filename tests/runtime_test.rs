use std::io::Write;

use serde_json::json;
use tempfile::{NamedTempFile, TempDir};

use signup_wizard::bootstrap::{load_config, EventDelivery, WizardRuntime};
use signup_wizard::{FlowKind, FormData, WizardOrchestrator, WizardPhase};
use sw_app::usecases::check_verification_code::{CODE_EXPIRED_MESSAGE, CODE_MISMATCH_MESSAGE};
use sw_core::flows::signup::SignupStep;
use sw_core::ExitReason;

fn write_config(outbox: &std::path::Path) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        [wizard]
        remote_check_timeout_ms = 2000

        [verification]
        resend_cooldown_secs = 60

        [submission]
        outbox_dir = "{}"
        "#,
        outbox.display()
    )
    .unwrap();
    file
}

fn wired(dir: &TempDir, delivery: EventDelivery) -> WizardRuntime {
    let config_file = write_config(&dir.path().join("outbox"));
    let config = load_config(config_file.path().to_path_buf()).unwrap();
    WizardRuntime::wire(&config, delivery).unwrap()
}

fn personal_info(email: &str) -> FormData {
    FormData::new()
        .with("firstName", "Ada")
        .with("lastName", "Lovelace")
        .with("email", email)
        .with("dateOfBirth", "1990-12-10")
        .with("country", "GB")
}

#[tokio::test]
async fn individual_signup_lands_in_outbox() {
    let dir = TempDir::new().unwrap();
    let runtime = wired(&dir, EventDelivery::Broadcast);
    let mut changes = runtime.subscribe_signup().unwrap();
    let wizard = runtime.signup_wizard().unwrap();

    wizard
        .advance(FormData::new().with("accountType", "Individual"))
        .await
        .unwrap();
    wizard
        .advance(FormData::new().with("intents", json!(["Donate"])))
        .await
        .unwrap();
    wizard.advance(personal_info("ada@example.org")).await.unwrap();
    let state = wizard.wait_for_pending_check().await;
    assert_eq!(state.current_step, SignupStep::Verification);

    let request_code = runtime.request_verification_code();
    request_code.execute("ada@example.org").await.unwrap();
    let code = runtime
        .code_sender()
        .code_for("ada@example.org")
        .await
        .unwrap();

    wizard
        .advance(FormData::new().with("verificationCode", code.as_str()))
        .await
        .unwrap();
    let state = wizard.wait_for_pending_check().await;
    assert_eq!(state.current_step, SignupStep::Completion);

    let state = wizard.submit().await.unwrap();
    let reference = match state.phase {
        WizardPhase::Exited(ExitReason::Submitted { reference }) => reference.unwrap(),
        other => panic!("unexpected phase {other:?}"),
    };

    let pending = runtime.submission_outbox().pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].reference, reference);
    assert_eq!(pending[0].flow, FlowKind::Signup);
    assert_eq!(pending[0].data.get_str("email"), Some("ada@example.org"));

    let first = changes.recv().await.unwrap();
    assert_eq!(first.flow, FlowKind::Signup);
    assert_eq!(first.state.current_step, SignupStep::IntentSelection);
}

#[tokio::test]
async fn registered_email_is_rejected_on_personal_info() {
    let dir = TempDir::new().unwrap();
    let runtime = wired(&dir, EventDelivery::LogOnly);
    runtime.email_directory().register("ada@example.org").await;
    let wizard = runtime.signup_wizard().unwrap();

    wizard
        .advance(FormData::new().with("accountType", "Individual"))
        .await
        .unwrap();
    wizard
        .advance(FormData::new().with("intents", json!(["Donate"])))
        .await
        .unwrap();
    wizard.advance(personal_info("ADA@example.org")).await.unwrap();
    let state = wizard.wait_for_pending_check().await;

    assert_eq!(state.phase, WizardPhase::Active);
    assert_eq!(state.current_step, SignupStep::PersonalInfo);
    assert!(!state.is_completed(SignupStep::PersonalInfo));
    assert!(runtime.submission_outbox().pending().await.unwrap().is_empty());
}

async fn reach_verification(wizard: &WizardOrchestrator<SignupStep>) {
    wizard
        .advance(FormData::new().with("accountType", "Individual"))
        .await
        .unwrap();
    wizard
        .advance(FormData::new().with("intents", json!(["Donate"])))
        .await
        .unwrap();
    wizard.advance(personal_info("ada@example.org")).await.unwrap();
    let state = wizard.wait_for_pending_check().await;
    assert_eq!(state.current_step, SignupStep::Verification);
}

#[tokio::test]
async fn wrong_verification_code_keeps_user_on_step() {
    let dir = TempDir::new().unwrap();
    let runtime = wired(&dir, EventDelivery::LogOnly);
    let wizard = runtime.signup_wizard().unwrap();
    reach_verification(&wizard).await;

    runtime
        .request_verification_code()
        .execute("ada@example.org")
        .await
        .unwrap();
    let issued = runtime
        .code_sender()
        .code_for("ada@example.org")
        .await
        .unwrap();
    let wrong = if issued == "000000" { "111111" } else { "000000" };

    wizard
        .advance(FormData::new().with("verificationCode", wrong))
        .await
        .unwrap();
    let state = wizard.wait_for_pending_check().await;

    assert_eq!(state.phase, WizardPhase::Active);
    assert_eq!(state.current_step, SignupStep::Verification);
    assert!(!state.is_completed(SignupStep::Verification));
    assert_eq!(
        state
            .validation
            .as_ref()
            .and_then(|v| v.field_error("verificationCode")),
        Some(CODE_MISMATCH_MESSAGE)
    );

    let state = wizard.submit().await.unwrap();
    assert!(!state.is_exited());
    assert!(runtime.submission_outbox().pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn verification_without_a_sent_code_is_rejected() {
    let dir = TempDir::new().unwrap();
    let runtime = wired(&dir, EventDelivery::LogOnly);
    let wizard = runtime.signup_wizard().unwrap();
    reach_verification(&wizard).await;

    wizard
        .advance(FormData::new().with("verificationCode", "123456"))
        .await
        .unwrap();
    let state = wizard.wait_for_pending_check().await;

    assert_eq!(state.current_step, SignupStep::Verification);
    assert_eq!(
        state
            .validation
            .as_ref()
            .and_then(|v| v.field_error("verificationCode")),
        Some(CODE_EXPIRED_MESSAGE)
    );
}

#[tokio::test]
async fn resend_is_refused_inside_configured_cooldown() {
    let dir = TempDir::new().unwrap();
    let runtime = wired(&dir, EventDelivery::LogOnly);
    let request_code = runtime.request_verification_code();

    request_code.execute("ada@example.org").await.unwrap();
    let err = runtime
        .request_verification_code()
        .execute("ada@example.org")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("before requesting another code"));
}

#[tokio::test]
async fn reference_choices_come_from_bundled_table() {
    let dir = TempDir::new().unwrap();
    let runtime = wired(&dir, EventDelivery::LogOnly);

    let choices = runtime
        .list_reference_choices()
        .execute(Some("KE"))
        .await
        .unwrap();

    assert!(choices.countries.iter().any(|c| c.code == "GB"));
    assert!(!choices.regions.is_empty());
}
