//! # Pure data module
//!
//! Configuration DTOs and the TOML -> DTO mapping. No validation and no
//! default calculation happen here: a missing value is recorded as `None`,
//! which is a fact and not an error. Consumers decide what `None` means.

use std::path::PathBuf;

/// Wizard configuration DTO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardConfig {
    /// Upper bound for one remote validation call.
    pub remote_check_timeout_ms: Option<u64>,

    /// Message shown when a validator could not run.
    pub failure_message: Option<String>,

    pub resend_cooldown_secs: Option<u64>,
    pub code_ttl_secs: Option<u64>,

    /// Directory the file submission adapter writes into (path only, existence
    /// is not checked).
    pub outbox_dir: Option<PathBuf>,
}

impl WizardConfig {
    /// Map a parsed TOML document.
    ///
    /// Negative integers are kept out rather than clamped: they become `None`
    /// like any other unusable value.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let section_int = |section: &str, key: &str| {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_integer())
                .and_then(|v| u64::try_from(v).ok())
        };
        let section_str = |section: &str, key: &str| {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        Ok(Self {
            remote_check_timeout_ms: section_int("wizard", "remote_check_timeout_ms"),
            failure_message: section_str("wizard", "failure_message"),
            resend_cooldown_secs: section_int("verification", "resend_cooldown_secs"),
            code_ttl_secs: section_int("verification", "code_ttl_secs"),
            outbox_dir: section_str("submission", "outbox_dir").map(PathBuf::from),
        })
    }

    pub fn empty() -> Self {
        Self {
            remote_check_timeout_ms: None,
            failure_message: None,
            resend_cooldown_secs: None,
            code_ttl_secs: None,
            outbox_dir: None,
        }
    }

    /// Config for a fresh install: only the outbox location is derived, from
    /// a base directory the caller computes (e.g. with the `dirs` crate).
    pub fn with_defaults(data_dir: PathBuf) -> Self {
        Self {
            outbox_dir: Some(data_dir.join("outbox")),
            ..Self::empty()
        }
    }
}
