//! Tracing configuration for the signup wizard.
//!
//! ## Behavior
//!
//! - **Development**: debug level for the wizard crates
//! - **Production**: info level
//! - **File logging**: optional, a non-rolling `signup-wizard.log` in the
//!   directory the caller passes; stdout is always on

use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, prelude::*, registry};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Check if running in development environment
fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Build the default filter directives for tracing
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let crate_level = if is_dev { "debug" } else { "info" };
    vec![
        if is_dev { "debug" } else { "info" }.to_string(),
        "tokio=warn".to_string(),
        format!("sw_core={crate_level}"),
        format!("sw_app={crate_level}"),
        format!("sw_infra={crate_level}"),
        format!("signup_wizard={crate_level}"),
    ]
}

/// Initialize the tracing subscriber.
///
/// Respects `RUST_LOG`; falls back to [`build_filter_directives`]. When
/// `log_dir` is given, a second fmt layer writes to a file in it. If the file
/// cannot be opened, logging continues on stdout only.
///
/// ## Errors
///
/// Returns `Err` if a subscriber is already registered (call once).
pub fn init_tracing_subscriber(log_dir: Option<&Path>) -> anyhow::Result<()> {
    let is_dev = is_development();

    let filter_directives = build_filter_directives(is_dev);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter_directives.join(",")));

    // "2026-01-15 10:30:45.123 INFO [orchestrator.rs:42] [sw_app::...] message"
    let stdout_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)));

    let file_writer = match log_dir.map(build_file_writer).transpose() {
        Ok(writer) => writer,
        Err(err) => {
            eprintln!("Failed to initialize file logging, falling back to stdout: {err}");
            None
        }
    };
    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
    });

    registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

fn build_file_writer(log_dir: &Path) -> anyhow::Result<NonBlocking> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, "signup-wizard.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Tracing log guard already initialized"))?;

    Ok(non_blocking)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_directives() {
        let dev_directives = build_filter_directives(true);
        assert!(dev_directives.contains(&"debug".to_string()));
        assert!(dev_directives.contains(&"sw_app=debug".to_string()));
        assert!(dev_directives.contains(&"tokio=warn".to_string()));

        let prod_directives = build_filter_directives(false);
        assert!(prod_directives.contains(&"info".to_string()));
        assert!(prod_directives.contains(&"sw_core=info".to_string()));
        assert!(prod_directives.contains(&"sw_infra=info".to_string()));
    }

    #[test]
    fn test_directives_parse_as_env_filter() {
        let joined = build_filter_directives(false).join(",");
        assert!(tracing_subscriber::EnvFilter::try_new(joined).is_ok());
    }

    #[test]
    fn test_build_file_writer_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        // Only the first call in this process may store the guard.
        let _ = build_file_writer(&log_dir);

        assert!(log_dir.is_dir());
    }
}
