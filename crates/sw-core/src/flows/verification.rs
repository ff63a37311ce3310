//! Verification-code countdowns.
//!
//! The verification step owns these timers; the wizard controller never sees
//! them. All methods take the current time explicitly so callers can drive
//! them from a `ClockPort`.

use serde::{Deserialize, Serialize};

use crate::config::WizardConfig;

pub const DEFAULT_RESEND_COOLDOWN_MS: u64 = 60_000;
pub const DEFAULT_CODE_TTL_MS: u64 = 10 * 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationTimer {
    pub resend_cooldown_ms: u64,
    pub code_ttl_ms: u64,
    pub last_sent_ms: Option<u64>,
}

impl Default for VerificationTimer {
    fn default() -> Self {
        Self::new(DEFAULT_RESEND_COOLDOWN_MS, DEFAULT_CODE_TTL_MS)
    }
}

impl VerificationTimer {
    pub fn new(resend_cooldown_ms: u64, code_ttl_ms: u64) -> Self {
        Self {
            resend_cooldown_ms,
            code_ttl_ms,
            last_sent_ms: None,
        }
    }

    /// Missing config values fall back to the defaults above.
    pub fn from_config(config: &WizardConfig) -> Self {
        Self::new(
            config
                .resend_cooldown_secs
                .map_or(DEFAULT_RESEND_COOLDOWN_MS, |secs| secs.saturating_mul(1000)),
            config
                .code_ttl_secs
                .map_or(DEFAULT_CODE_TTL_MS, |secs| secs.saturating_mul(1000)),
        )
    }

    pub fn can_resend_at(&self, now_ms: u64) -> bool {
        self.resend_remaining_ms_at(now_ms) == 0
    }

    pub fn resend_remaining_ms_at(&self, now_ms: u64) -> u64 {
        match self.last_sent_ms {
            None => 0,
            Some(sent) => {
                let elapsed = now_ms.saturating_sub(sent);
                self.resend_cooldown_ms.saturating_sub(elapsed)
            }
        }
    }

    /// A code that was never sent counts as expired.
    pub fn code_expired_at(&self, now_ms: u64) -> bool {
        match self.last_sent_ms {
            None => true,
            Some(sent) => now_ms.saturating_sub(sent) >= self.code_ttl_ms,
        }
    }

    pub fn mark_sent_at(&mut self, now_ms: u64) {
        self.last_sent_ms = Some(now_ms);
    }
}
