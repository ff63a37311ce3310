//! Submission port
//!
//! Invoked only from a flow's terminal step with the full accumulated data.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flows::FlowKind;
use crate::form::FormData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub reference: String,
    pub accepted_at: DateTime<Utc>,
}

#[async_trait]
pub trait SubmissionPort: Send + Sync {
    /// Failures are surfaced to the user as `last_error`; the wizard keeps its
    /// state so the submission can be retried.
    async fn submit(&self, flow: FlowKind, data: &FormData) -> anyhow::Result<SubmissionReceipt>;
}
