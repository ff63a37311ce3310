//! Use case for sending (and re-sending) the verification code.
//!
//! The cooldown belongs to the verification step. The wizard only ever sees
//! the code the user types back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, info_span, warn, Instrument};

use sw_core::flows::verification::VerificationTimer;
use sw_core::ports::{ClockPort, VerificationCodePort};

#[derive(Debug, thiserror::Error)]
pub enum RequestCodeError {
    #[error("a destination is required")]
    MissingDestination,
    #[error("please wait {remaining_secs}s before requesting another code")]
    Cooldown { remaining_secs: u64 },
    #[error("failed to send verification code: {0}")]
    Delivery(#[source] anyhow::Error),
}

/// What the step shows after a code went out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeDispatched {
    pub sent_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub resend_available_at: DateTime<Utc>,
}

pub struct RequestVerificationCode {
    clock: Arc<dyn ClockPort>,
    sender: Arc<dyn VerificationCodePort>,
    timer: Mutex<VerificationTimer>,
}

impl RequestVerificationCode {
    pub fn new(
        clock: Arc<dyn ClockPort>,
        sender: Arc<dyn VerificationCodePort>,
        timer: VerificationTimer,
    ) -> Self {
        Self {
            clock,
            sender,
            timer: Mutex::new(timer),
        }
    }

    pub async fn execute(&self, destination: &str) -> Result<CodeDispatched, RequestCodeError> {
        let span = info_span!("usecase.request_verification_code.execute");

        async {
            let destination = destination.trim();
            if destination.is_empty() {
                return Err(RequestCodeError::MissingDestination);
            }

            // Held across the send so two quick clicks cannot both pass the
            // cooldown check.
            let mut timer = self.timer.lock().await;
            let now_ms = self.now_ms();
            if !timer.can_resend_at(now_ms) {
                let remaining_ms = timer.resend_remaining_ms_at(now_ms);
                warn!(remaining_ms, "verification code requested during cooldown");
                return Err(RequestCodeError::Cooldown {
                    remaining_secs: remaining_ms.div_ceil(1000),
                });
            }

            self.sender
                .send_code(destination)
                .await
                .map_err(RequestCodeError::Delivery)?;
            timer.mark_sent_at(now_ms);
            info!("verification code sent");

            Ok(CodeDispatched {
                sent_at: to_datetime(now_ms),
                expires_at: to_datetime(now_ms.saturating_add(timer.code_ttl_ms)),
                resend_available_at: to_datetime(now_ms.saturating_add(timer.resend_cooldown_ms)),
            })
        }
        .instrument(span)
        .await
    }

    pub async fn resend_remaining_ms(&self) -> u64 {
        self.timer
            .lock()
            .await
            .resend_remaining_ms_at(self.now_ms())
    }

    pub async fn is_code_expired(&self) -> bool {
        self.timer.lock().await.code_expired_at(self.now_ms())
    }

    /// Ask the sender whether `code` is the last one issued for `destination`.
    /// Expiry is checked separately with [`Self::is_code_expired`].
    pub async fn code_matches(&self, destination: &str, code: &str) -> anyhow::Result<bool> {
        self.sender.code_matches(destination.trim(), code).await
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.clock.now_ms()).unwrap_or(0)
    }
}

fn to_datetime(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct ManualClock(AtomicI64);

    impl ClockPort for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct CountingSender {
        sent: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl VerificationCodePort for CountingSender {
        async fn send_code(&self, _destination: &str) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("smtp relay refused connection");
            }
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn code_matches(&self, _destination: &str, _code: &str) -> anyhow::Result<bool> {
            Ok(false)
        }
    }

    fn build(fail: bool) -> (RequestVerificationCode, Arc<ManualClock>, Arc<CountingSender>) {
        let clock = Arc::new(ManualClock(AtomicI64::new(1_700_000_000_000)));
        let sender = Arc::new(CountingSender {
            sent: AtomicUsize::new(0),
            fail,
        });
        let uc = RequestVerificationCode::new(
            clock.clone(),
            sender.clone(),
            VerificationTimer::new(30_000, 300_000),
        );
        (uc, clock, sender)
    }

    #[tokio::test]
    async fn second_request_inside_cooldown_is_refused() {
        let (uc, clock, sender) = build(false);

        let dispatched = uc.execute("ada@example.org").await.expect("first send");
        assert_eq!(
            (dispatched.expires_at - dispatched.sent_at).num_seconds(),
            300
        );

        clock.0.fetch_add(10_500, Ordering::SeqCst);
        let err = uc.execute("ada@example.org").await.expect_err("cooldown");
        assert!(matches!(err, RequestCodeError::Cooldown { remaining_secs: 20 }));
        assert_eq!(sender.sent.load(Ordering::SeqCst), 1);

        clock.0.fetch_add(20_000, Ordering::SeqCst);
        uc.execute("ada@example.org").await.expect("resend after cooldown");
        assert_eq!(sender.sent.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_delivery_does_not_start_cooldown() {
        let (uc, _clock, _sender) = build(true);

        let err = uc.execute("ada@example.org").await.expect_err("delivery");
        assert!(matches!(err, RequestCodeError::Delivery(_)));
        assert_eq!(uc.resend_remaining_ms().await, 0);
        assert!(uc.is_code_expired().await);
    }

    #[tokio::test]
    async fn blank_destination_is_rejected() {
        let (uc, _clock, sender) = build(false);

        let err = uc.execute("   ").await.expect_err("blank");
        assert!(matches!(err, RequestCodeError::MissingDestination));
        assert_eq!(sender.sent.load(Ordering::SeqCst), 0);
    }
}
