use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup logging from the CI environment.
///
/// The console layer is always installed; it is what shows up in the CI log.
/// Debug level follows the runner's own debug switch (`RUNNER_DEBUG=1`).
/// When `PA11Y_GATE_LOG_DIR` names a directory, a daily-rotating file layer
/// is added as well, which is useful when diagnosing a run after the fact on
/// a self-hosted runner.
///
/// # Returns
/// A guard that must be held for the duration of the program when file
/// logging is active, `None` otherwise
pub fn init_from_env() -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let debug_mode = std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1");
    let log_dir = std::env::var("PA11Y_GATE_LOG_DIR")
        .ok()
        .filter(|dir| !dir.trim().is_empty());

    setup_logging(debug_mode, log_dir.as_deref())
}

/// Setup logging with console output and an optional rotating file appender.
///
/// # Arguments
/// * `debug_mode` - If true, use debug level; otherwise use info level
/// * `log_dir` - Optional directory for daily-rotating log files
///
/// # Returns
/// A guard that must be held for the duration of the program to keep file
/// logging active, `None` when no log directory was given
pub fn setup_logging(
    debug_mode: bool,
    log_dir: Option<&str>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    // Determine log level based on debug mode
    let env_filter = if debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let guard = if let Some(dir) = log_dir {
        // Create log directory if it doesn't exist
        let log_path = Utf8PathBuf::from(dir);
        if !log_path.exists() {
            fs::create_dir_all(&log_path)
                .with_context(|| format!("Failed to create log directory: {dir}"))?;
        }

        // Create daily rotating file appender
        let file_appender = rolling::daily(dir, "pa11y-gate");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false) // No ANSI codes in log files
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        // Console layer; the CI web UI renders ANSI colors
        let console_layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(console_layer)
            .try_init()
            .context("Failed to initialize logging subscriber")?;

        Some(guard)
    } else {
        // Console layer; the CI web UI renders ANSI colors
        let console_layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .try_init()
            .context("Failed to initialize logging subscriber")?;

        None
    };

    tracing::debug!(
        "Logging initialized: debug={}, file_dir={:?}",
        debug_mode,
        log_dir
    );

    Ok(guard)
}
