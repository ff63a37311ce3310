//! Remote check of the verification step: the typed code must be the one
//! last sent to the address given earlier, and still fresh.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info_span, warn, Instrument};

use sw_core::flows::signup::{FIELD_VERIFICATION_CODE, VERIFICATION_DESTINATION_FIELDS};
use sw_core::ports::RemoteCheckPort;
use sw_core::{FormData, ValidationResult, ValidatorFault};

use super::RequestVerificationCode;

pub const CODE_EXPIRED_MESSAGE: &str = "This code has expired, request a new one";
pub const CODE_MISMATCH_MESSAGE: &str = "That code is not the one we sent";

/// Shares the [`RequestVerificationCode`] of the session so expiry follows
/// the last code actually sent.
pub struct CheckVerificationCode {
    request: Arc<RequestVerificationCode>,
}

impl CheckVerificationCode {
    pub fn new(request: Arc<RequestVerificationCode>) -> Self {
        Self { request }
    }
}

fn destination(data: &FormData) -> Option<&str> {
    VERIFICATION_DESTINATION_FIELDS
        .iter()
        .filter_map(|field| data.get_str(field))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

#[async_trait]
impl RemoteCheckPort for CheckVerificationCode {
    async fn check(&self, data: &FormData) -> Result<ValidationResult, ValidatorFault> {
        let span = info_span!("usecase.check_verification_code.check");

        async {
            let Some(destination) = destination(data) else {
                return Err(ValidatorFault::new("no address to verify the code against"));
            };
            let code = data.get_str(FIELD_VERIFICATION_CODE).unwrap_or_default();

            if self.request.is_code_expired().await {
                debug!("verification code expired or never sent");
                return Ok(ValidationResult::field(
                    FIELD_VERIFICATION_CODE,
                    CODE_EXPIRED_MESSAGE,
                ));
            }
            let matches = self
                .request
                .code_matches(destination, code)
                .await
                .map_err(|e| {
                    warn!(error = %e, "verification code lookup failed");
                    ValidatorFault::new(format!("verification code lookup failed: {e}"))
                })?;
            if !matches {
                debug!("verification code mismatch");
                return Ok(ValidationResult::field(
                    FIELD_VERIFICATION_CODE,
                    CODE_MISMATCH_MESSAGE,
                ));
            }
            Ok(ValidationResult::Valid)
        }
        .instrument(span)
        .await
    }
}
