//! Reference data port
//!
//! Lists that specific steps use to populate choices (countries, regions).
//! Not part of the state machine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOption {
    pub code: String,
    pub name: String,
}

impl ReferenceOption {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

#[async_trait]
pub trait ReferenceDataPort: Send + Sync {
    async fn countries(&self) -> anyhow::Result<Vec<ReferenceOption>>;

    /// Regions of `country_code`. Unknown countries yield an empty list.
    async fn regions(&self, country_code: &str) -> anyhow::Result<Vec<ReferenceOption>>;
}
