//! # Configuration Loader
//!
//! Reads the TOML file and hands it to the `WizardConfig` mapping.
//!
//! No validation and no defaults here: whatever is in the file is accepted,
//! and missing sections become empty facts. Defaults are applied by
//! `wiring` when ports are built.

use std::path::PathBuf;

use anyhow::Context;
use sw_core::WizardConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read (I/O error)
/// - Content is not valid TOML (parse error)
pub fn load_config(config_path: PathBuf) -> anyhow::Result<WizardConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    WizardConfig::from_toml(&toml_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_load_config_reads_valid_toml() {
        let temp_file = write_config(
            r#"
            [wizard]
            remote_check_timeout_ms = 2500
            failure_message = "Try again shortly"

            [verification]
            resend_cooldown_secs = 45
            code_ttl_secs = 900

            [submission]
            outbox_dir = "/var/lib/signup/outbox"
        "#,
        );

        let config = load_config(temp_file.path().to_path_buf()).unwrap();

        assert_eq!(config.remote_check_timeout_ms, Some(2500));
        assert_eq!(config.failure_message.as_deref(), Some("Try again shortly"));
        assert_eq!(config.resend_cooldown_secs, Some(45));
        assert_eq!(config.code_ttl_secs, Some(900));
        assert_eq!(
            config.outbox_dir,
            Some(PathBuf::from("/var/lib/signup/outbox"))
        );
    }

    #[test]
    fn test_load_config_returns_empty_values_when_missing() {
        let temp_file = write_config(
            r#"
            [wizard]
            # nothing configured

            [submission]
        "#,
        );

        let config = load_config(temp_file.path().to_path_buf()).unwrap();

        assert_eq!(config, WizardConfig::empty());
    }

    #[test]
    fn test_load_config_accepts_empty_failure_message() {
        // An empty message is a fact; the orchestrator decides what to show.
        let temp_file = write_config(
            r#"
            [wizard]
            failure_message = ""
        "#,
        );

        let config = load_config(temp_file.path().to_path_buf()).unwrap();

        assert_eq!(config.failure_message.as_deref(), Some(""));
    }

    #[test]
    fn test_load_config_fails_on_missing_file() {
        let err = load_config(PathBuf::from("/nonexistent/signup-wizard.toml")).unwrap_err();

        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_fails_on_invalid_toml() {
        let temp_file = write_config("[wizard\nremote_check_timeout_ms = ");

        let err = load_config(temp_file.path().to_path_buf()).unwrap_err();

        assert!(err.to_string().contains("Failed to parse config as TOML"));
    }
}
