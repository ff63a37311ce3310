//! File-based submission outbox
//!
//! Writes each accepted submission as one JSON envelope into a directory that
//! a separate delivery process drains. The wizard only needs to know the
//! envelope was durably written.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

use sw_core::ports::{SubmissionPort, SubmissionReceipt};
use sw_core::{FlowKind, FormData};

pub const DEFAULT_OUTBOX_DIR: &str = "outbox";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionEnvelope {
    pub reference: String,
    pub flow: FlowKind,
    pub submitted_at: DateTime<Utc>,
    pub data: FormData,
}

pub struct FileSubmissionOutbox {
    outbox_dir: PathBuf,
}

impl FileSubmissionOutbox {
    pub fn new(outbox_dir: PathBuf) -> Self {
        Self { outbox_dir }
    }

    /// Create outbox under the app data dir
    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self {
            outbox_dir: base_dir.join(DEFAULT_OUTBOX_DIR),
        }
    }

    pub fn outbox_dir(&self) -> &Path {
        &self.outbox_dir
    }

    /// Envelopes currently waiting in the outbox, oldest first.
    pub async fn pending(&self) -> anyhow::Result<Vec<SubmissionEnvelope>> {
        if !self.outbox_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = fs::read_dir(&self.outbox_dir).await?;
        let mut envelopes = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path).await?;
            let envelope: SubmissionEnvelope = serde_json::from_str(&content).map_err(|e| {
                anyhow::anyhow!("Failed to parse submission {}: {e}", path.display())
            })?;
            envelopes.push(envelope);
        }
        envelopes.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(envelopes)
    }

    fn reference_for(flow: FlowKind) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let prefix = match flow {
            FlowKind::Signup => "SU",
            FlowKind::Sponsor => "SP",
            FlowKind::Judge => "JU",
        };
        format!("{prefix}-{}", &id[..12]).to_uppercase()
    }
}

#[async_trait]
impl SubmissionPort for FileSubmissionOutbox {
    async fn submit(&self, flow: FlowKind, data: &FormData) -> anyhow::Result<SubmissionReceipt> {
        fs::create_dir_all(&self.outbox_dir)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create outbox directory: {e}"))?;

        let envelope = SubmissionEnvelope {
            reference: Self::reference_for(flow),
            flow,
            submitted_at: Utc::now(),
            data: data.clone(),
        };
        let json = serde_json::to_string_pretty(&envelope)
            .map_err(|e| anyhow::anyhow!("Failed to serialize submission: {e}"))?;

        // Write under a temporary name and rename, so the delivery process
        // never picks up a half-written envelope.
        let final_path = self.outbox_dir.join(format!("{}.json", envelope.reference));
        let temp_path = final_path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create submission file: {e}"))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write submission file: {e}"))?;
        file.sync_all()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to sync submission file: {e}"))?;
        fs::rename(&temp_path, &final_path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to publish submission file: {e}"))?;

        info!(flow = %flow, reference = %envelope.reference, "submission written to outbox");
        Ok(SubmissionReceipt {
            reference: envelope.reference,
            accepted_at: envelope.submitted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn submit_writes_envelope_with_reference() {
        let temp_dir = TempDir::new().unwrap();
        let outbox = FileSubmissionOutbox::new(temp_dir.path().join("outbox"));
        let data = FormData::new()
            .with("organizationName", "Northwind")
            .with("contributionType", "In-Kind");

        let receipt = outbox.submit(FlowKind::Sponsor, &data).await.unwrap();

        assert!(receipt.reference.starts_with("SP-"));
        let pending = outbox.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].reference, receipt.reference);
        assert_eq!(pending[0].flow, FlowKind::Sponsor);
        assert_eq!(pending[0].data, data);
    }

    #[tokio::test]
    async fn references_are_unique() {
        let temp_dir = TempDir::new().unwrap();
        let outbox = FileSubmissionOutbox::with_defaults(temp_dir.path().to_path_buf());

        let first = outbox.submit(FlowKind::Signup, &FormData::new()).await.unwrap();
        let second = outbox.submit(FlowKind::Signup, &FormData::new()).await.unwrap();

        assert_ne!(first.reference, second.reference);
        assert_eq!(outbox.pending().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_outbox_has_nothing_pending() {
        let temp_dir = TempDir::new().unwrap();
        let outbox = FileSubmissionOutbox::new(temp_dir.path().join("never-created"));

        assert!(outbox.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_envelope_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.json"), "{not json")
            .await
            .unwrap();
        let outbox = FileSubmissionOutbox::new(temp_dir.path().to_path_buf());

        let result = outbox.pending().await;

        assert!(result.unwrap_err().to_string().contains("Failed to parse"));
    }

    #[test]
    fn with_defaults_uses_expected_path() {
        let outbox = FileSubmissionOutbox::with_defaults(PathBuf::from("/tmp/signup"));

        assert_eq!(outbox.outbox_dir(), Path::new("/tmp/signup/outbox"));
    }
}
