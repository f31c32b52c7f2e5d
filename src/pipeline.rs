//! Run orchestration: resolve arguments, run the scanner, publish outputs,
//! enforce the threshold.
//!
//! Components run strictly left to right. Outputs (`report_path`,
//! `exit_code`) are published as soon as a scan has run, before any
//! post-scan failure is raised, so downstream steps can always inspect the
//! report - on failing runs included.

use crate::ci;
use crate::models::RunConfig;
use crate::services::{self, EnforcementOutcome, ScanService};
use crate::workspace::RunContext;
use anyhow::Result;
use thiserror::Error;

/// Failures raised by the orchestration itself
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("pa11y-ci exited with code {0}")]
    ScannerNonZeroExit(i32),
}

/// Execute one full gate run.
///
/// # Arguments
/// * `service` - Scanner execution service (injectable for tests)
/// * `config` - Resolved run configuration
/// * `ctx` - Run context providing the workspace root and scratch directory
///
/// # Errors
///
/// - [`ScanError::MissingTarget`](crate::services::ScanError::MissingTarget)
///   before any process is spawned when neither `url` nor `config` is set
/// - [`PipelineError::ScannerNonZeroExit`] when the scanner fails on its own
/// - [`EnforcementError::IssuesExceedThreshold`](crate::services::EnforcementError::IssuesExceedThreshold)
///   when the scanner succeeded but the report tally is above the threshold
pub async fn execute(service: &ScanService, config: &RunConfig, ctx: &RunContext) -> Result<()> {
    log_inputs(config);

    // Fails before any spawn when neither url nor config is present
    let args = service.build_args(config)?;

    let report_path = ctx.resolve_report_path(&config.report_file);
    tracing::info!("Report will be saved to: {}", report_path);

    let scan = service
        .run(&args, &report_path, Some(ctx.scratch_dir()))
        .await?;

    tracing::info!("pa11y-ci exit code: {}", scan.exit_code);

    // Published on every path from here on, pass or fail
    ci::set_output("report_path", scan.report_path.as_str())?;
    ci::set_output("exit_code", &scan.exit_code.to_string())?;

    // Threshold enforcement only interprets a JSON report from a successful
    // scanner run; parse failures degrade to the exit-code path below.
    if services::applies(&config.reporter, scan.exit_code) {
        match services::enforce(&scan.report_path, config.threshold).await {
            Ok(EnforcementOutcome::Passed { .. }) => {}
            Ok(EnforcementOutcome::Skipped { reason }) => {
                ci::warning(&format!("Failed to parse/enforce JSON threshold: {reason}"));
            }
            Err(err) => return Err(err.into()),
        }
    }

    if scan.exit_code != 0 {
        if !scan.stderr.is_empty() {
            ci::error(&scan.stderr);
        }
        return Err(PipelineError::ScannerNonZeroExit(scan.exit_code).into());
    }

    if let Ok(repo) = std::env::var("GITHUB_REPOSITORY") {
        if !repo.is_empty() {
            tracing::info!("Repo: {}", repo);
        }
    }

    Ok(())
}

/// Log the resolved inputs in a collapsible group, headers redacted.
fn log_inputs(config: &RunConfig) {
    ci::start_group("Inputs");
    match serde_json::to_string_pretty(&config.redacted()) {
        Ok(rendered) => tracing::info!("{}", rendered),
        Err(err) => tracing::warn!("Failed to render inputs: {}", err),
    }
    ci::end_group();
}
