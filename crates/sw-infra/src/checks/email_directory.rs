//! Email availability check backed by an in-memory directory of registered
//! addresses. Stands in for the account service in development and tests.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use sw_core::ports::RemoteCheckPort;
use sw_core::{FormData, ValidationResult, ValidatorFault};

pub const EMAIL_TAKEN_MESSAGE: &str = "This email is already registered";

pub struct InMemoryEmailDirectory {
    field: String,
    registered: RwLock<HashSet<String>>,
    latency: Duration,
}

impl InMemoryEmailDirectory {
    /// Checks the `email` field.
    pub fn new() -> Self {
        Self::for_field("email")
    }

    pub fn for_field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            registered: RwLock::new(HashSet::new()),
            latency: Duration::ZERO,
        }
    }

    /// Simulated round-trip time of each check.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub async fn register(&self, email: &str) {
        self.registered.write().await.insert(normalize(email));
    }

    pub async fn is_registered(&self, email: &str) -> bool {
        self.registered.read().await.contains(&normalize(email))
    }
}

impl Default for InMemoryEmailDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl RemoteCheckPort for InMemoryEmailDirectory {
    async fn check(&self, data: &FormData) -> Result<ValidationResult, ValidatorFault> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let Some(email) = data.get_str(&self.field) else {
            // Local validation runs first, so a missing field means the
            // record is not what this check was registered for.
            return Err(ValidatorFault::new(format!(
                "field {} missing from remote check input",
                self.field
            )));
        };
        if self.is_registered(email).await {
            debug!(field = %self.field, "email already registered");
            return Ok(ValidationResult::field(self.field.clone(), EMAIL_TAKEN_MESSAGE));
        }
        Ok(ValidationResult::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registered_email_is_rejected_case_insensitively() {
        let directory = InMemoryEmailDirectory::new();
        directory.register("Ada@Example.org").await;

        let result = directory
            .check(&FormData::new().with("email", " ada@example.org"))
            .await
            .unwrap();

        assert_eq!(result.field_error("email"), Some(EMAIL_TAKEN_MESSAGE));
    }

    #[tokio::test]
    async fn unknown_email_is_available() {
        let directory = InMemoryEmailDirectory::for_field("contactEmail");
        directory.register("ada@example.org").await;

        let result = directory
            .check(&FormData::new().with("contactEmail", "grace@example.org"))
            .await
            .unwrap();

        assert!(result.is_valid());
    }

    #[tokio::test]
    async fn missing_field_is_a_fault() {
        let directory = InMemoryEmailDirectory::new();

        let result = directory.check(&FormData::new()).await;

        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_the_answer() {
        let directory = InMemoryEmailDirectory::new().with_latency(Duration::from_millis(300));
        let started = tokio::time::Instant::now();

        directory
            .check(&FormData::new().with("email", "ada@example.org"))
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
