//! # Structured Logging Module
//!
//! Environment-aware structured logging that outputs to both console and files
//! so long stress runs leave a JSON trail next to the console summary.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Keeps the file writer alive; dropping it flushes buffered lines
#[derive(Debug)]
pub struct LoggingGuard {
    log_path: PathBuf,
    _worker: WorkerGuard,
}

impl LoggingGuard {
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Initialize structured logging with environment-specific configuration
///
/// `console_level` overrides the environment default for the console layer
/// (the CLI derives it from `-v`). `RUST_LOG` wins over both when set.
///
/// Hold the returned guard until exit. `None` when logging was already
/// initialized or the log directory could not be created.
pub fn init_structured_logging(console_level: Option<&str>) -> Option<LoggingGuard> {
    init_structured_logging_in(Path::new("log"), console_level)
}

/// [`init_structured_logging`] writing its JSON file under `log_dir`
pub fn init_structured_logging_in(
    log_dir: &Path,
    console_level: Option<&str>,
) -> Option<LoggingGuard> {
    if LOGGER_INITIALIZED.set(()).is_err() {
        return None;
    }

    let environment = get_environment();
    let file_level = get_log_level(&environment);
    let console_level = console_level.unwrap_or(file_level).to_string();

    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("Failed to create log directory {}: {e}", log_dir.display());
        return None;
    }

    let pid = process::id();
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let log_filename = format!("{environment}.{pid}.{timestamp}.log");
    let log_path = log_dir.join(&log_filename);

    let file_appender = tracing_appender::rolling::never(log_dir, &log_filename);
    let (file_writer, worker) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_ansi(true)
                .with_filter(build_filter(&console_level)),
        )
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(build_filter(file_level)),
        );

    // A subscriber may already be installed by an embedding test binary
    if subscriber.try_init().is_err() {
        tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
    }

    tracing::info!(
        pid = pid,
        environment = %environment,
        log_file = %log_path.display(),
        "🔧 STRUCTURED LOGGING: Initialized with file output"
    );

    Some(LoggingGuard {
        log_path,
        _worker: worker,
    })
}

fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("SOCIAL_HARNESS_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Map a `-v` count to a console level
pub fn console_level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Log structured data for one completed batch
pub fn log_batch_operation(
    batch_index: usize,
    num_batches: usize,
    first_item: usize,
    last_item: usize,
    succeeded: usize,
    failed: usize,
    duration_ms: u64,
) {
    tracing::info!(
        batch = batch_index + 1,
        num_batches = num_batches,
        first_item = first_item,
        last_item = last_item,
        succeeded = succeeded,
        failed = failed,
        duration_ms = duration_ms,
        timestamp = %Utc::now().to_rfc3339(),
        "📦 BATCH_OPERATION"
    );
}

/// Log structured data for a scenario step
pub fn log_scenario_step(
    scenario: &str,
    step: &str,
    status: &str,
    duration_ms: u64,
    details: Option<&str>,
) {
    tracing::info!(
        scenario = %scenario,
        step = %step,
        status = %status,
        duration_ms = duration_ms,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🧪 SCENARIO_STEP"
    );
}

/// Log structured data for provisioning operations
pub fn log_bootstrap_operation(target: &str, resource: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        target_system = %target,
        resource = %resource,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🏗️ BOOTSTRAP_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_detection() {
        std::env::set_var("SOCIAL_HARNESS_ENV", "test_override");
        let env = get_environment();
        assert_eq!(env, "test_override");
        std::env::remove_var("SOCIAL_HARNESS_ENV");
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(console_level_for_verbosity(0), "warn");
        assert_eq!(console_level_for_verbosity(1), "info");
        assert_eq!(console_level_for_verbosity(2), "debug");
        assert_eq!(console_level_for_verbosity(9), "trace");
    }
}
