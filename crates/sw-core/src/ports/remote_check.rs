use async_trait::async_trait;

use crate::form::FormData;
use crate::validation::{ValidationResult, ValidatorFault};

/// Asynchronous part of a step's validation (e.g. email availability).
///
/// `data` is the committed data merged with the candidate being submitted.
#[async_trait]
pub trait RemoteCheckPort: Send + Sync {
    async fn check(&self, data: &FormData) -> Result<ValidationResult, ValidatorFault>;
}
