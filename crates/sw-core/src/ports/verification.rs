use async_trait::async_trait;

/// Delivers one-time verification codes (email, SMS).
#[async_trait]
pub trait VerificationCodePort: Send + Sync {
    async fn send_code(&self, destination: &str) -> anyhow::Result<()>;

    /// Whether `code` is the last one issued for `destination`.
    async fn code_matches(&self, destination: &str, code: &str) -> anyhow::Result<bool>;
}
