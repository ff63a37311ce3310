//! Verification-code delivery that keeps the codes in memory instead of
//! sending mail. The verification step's remote check asks it whether a typed
//! code matches.

use std::collections::HashMap;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::Mutex;
use tracing::info;

use sw_core::ports::VerificationCodePort;

#[derive(Default)]
pub struct InMemoryCodeSender {
    codes: Mutex<HashMap<String, String>>,
}

impl InMemoryCodeSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last code issued for `destination`.
    pub async fn code_for(&self, destination: &str) -> Option<String> {
        self.codes.lock().await.get(&key(destination)).cloned()
    }

    pub async fn matches(&self, destination: &str, code: &str) -> bool {
        self.code_for(destination)
            .await
            .is_some_and(|issued| issued == code.trim())
    }
}

fn key(destination: &str) -> String {
    destination.trim().to_lowercase()
}

fn generate_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000u32))
}

#[async_trait]
impl VerificationCodePort for InMemoryCodeSender {
    async fn send_code(&self, destination: &str) -> anyhow::Result<()> {
        let code = generate_code();
        self.codes.lock().await.insert(key(destination), code);
        info!("verification code issued");
        Ok(())
    }

    async fn code_matches(&self, destination: &str, code: &str) -> anyhow::Result<bool> {
        Ok(self.matches(destination, code).await)
    }
}
