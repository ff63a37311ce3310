//! Step validation results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of running a step validator against merged form data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationResult {
    Valid,
    Invalid {
        field_errors: BTreeMap<String, String>,
        form_error: Option<String>,
    },
}

impl ValidationResult {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::default();
        errors.field(field, message);
        errors.into_result()
    }

    pub fn form(message: impl Into<String>) -> Self {
        Self::Invalid {
            field_errors: BTreeMap::new(),
            form_error: Some(message.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { field_errors, .. } => field_errors.get(field).map(String::as_str),
        }
    }

    pub fn form_error(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { form_error, .. } => form_error.as_deref(),
        }
    }
}

/// Accumulates messages while a validator walks its fields.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
    form: Option<String>,
}

impl ValidationErrors {
    /// Records a field message. The first message for a field wins.
    pub fn field(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
        self
    }

    pub fn form(&mut self, message: impl Into<String>) -> &mut Self {
        self.form.get_or_insert_with(|| message.into());
        self
    }

    /// Records `message` for `field` when the value is missing or blank.
    pub fn require(&mut self, field: &str, value: Option<&str>, message: &str) -> &mut Self {
        if value.map(str::trim).map_or(true, str::is_empty) {
            self.field(field, message);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.form.is_none()
    }

    pub fn into_result(self) -> ValidationResult {
        if self.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid {
                field_errors: self.fields,
                form_error: self.form,
            }
        }
    }
}

/// A validator that could not produce a verdict at all.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidatorFault {
    pub message: String,
}

impl ValidatorFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ValidatorFault {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("malformed form data: {err}"))
    }
}
