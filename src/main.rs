//! pa11y-gate - CI gate around the pa11y-ci accessibility scanner.
//!
//! Main entry point for the gate binary.
//!
//! # Overview
//!
//! One invocation is one run: resolve CI inputs, build the scanner argument
//! list, execute pa11y-ci with its stdout streamed into the report file,
//! publish `report_path`/`exit_code` as step outputs, and enforce the issue
//! threshold against the JSON report. The process exit status is the CI
//! failure marker.
//!
//! # Execution Flow
//!
//! 1. Initialize logging (console; optional rotating file via
//!    `PA11Y_GATE_LOG_DIR`)
//! 2. Create tokio runtime for subprocess execution
//! 3. Resolve inputs from `INPUT_*` variables
//! 4. Acquire the run context (workspace root, scoped scratch directory)
//! 5. Run the pipeline
//! 6. Map failures to CI error annotations and the exit status
//!
//! # Exit Status
//!
//! - 0: scanner succeeded and the issue tally is within the threshold
//! - 2: neither `url` nor `config` input was provided
//! - 1: any other failure (scanner non-zero exit, threshold exceeded,
//!   unexpected error)

use anyhow::Result;
use pa11y_gate::services::{ScanError, ScanService, ScannerCommand};
use pa11y_gate::workspace::RunContext;
use pa11y_gate::{APP_NAME, VERSION, ci, config, logging, pipeline};
use std::process::ExitCode;

const MISSING_TARGET_EXIT: u8 = 2;

fn main() -> ExitCode {
    // Setup logging first; everything downstream reports through tracing
    let _log_guard = match logging::init_from_env() {
        Ok(guard) => guard,
        Err(err) => {
            ci::error(&format!("Failed to initialize logging: {err:#}"));
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    // Create tokio runtime for async operations
    // This will handle subprocess execution and report file I/O
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("pa11y-gate-worker")
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            ci::error(&format!("Failed to create async runtime: {err}"));
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(run());

    // Shutdown the tokio runtime gracefully
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    match outcome {
        Ok(()) => {
            tracing::info!("Run passed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            // Every failure surfaces as a CI error annotation, never a crash
            ci::error(&format!("{err:#}"));
            if matches!(err.downcast_ref::<ScanError>(), Some(ScanError::MissingTarget)) {
                ExitCode::from(MISSING_TARGET_EXIT)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run() -> Result<()> {
    let config = config::resolve_inputs()?;

    // The context owns the scratch directory; dropping it at the end of this
    // scope removes the directory on success and failure paths alike
    let ctx = RunContext::acquire()?;
    tracing::info!("Workspace root: {}", ctx.workspace_root());

    let service = ScanService::new(ScannerCommand::from_env());
    pipeline::execute(&service, &config, &ctx).await
}
