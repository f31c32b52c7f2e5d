use crate::models::report::{parse_report, total_issues};
use camino::Utf8Path;
use thiserror::Error;

/// The only reporter whose output this gate knows how to interpret.
const JSON_REPORTER: &str = "json";

/// Fatal enforcement outcomes
#[derive(Error, Debug)]
pub enum EnforcementError {
    #[error("accessibility issues exceed threshold: {found} > {threshold}")]
    IssuesExceedThreshold { found: usize, threshold: i64 },
}

/// Non-fatal result of a threshold check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnforcementOutcome {
    /// The report parsed and the tally is within the threshold
    Passed { issues: usize },
    /// The report could not be read or parsed; enforcement was skipped and
    /// the run outcome falls back to the exit-code path
    Skipped { reason: String },
}

/// Whether threshold enforcement applies to this scan at all.
///
/// Only a structured JSON report from a successful scanner run is parsed: a
/// non-zero exit is a hard failure on its own, and a non-JSON reporter's
/// output is never interpreted.
pub fn applies(reporter: &str, exit_code: i32) -> bool {
    reporter == JSON_REPORTER && exit_code == 0
}

/// Read the report file, tally issues, and compare against the threshold.
///
/// Read and parse failures are non-fatal: they produce
/// [`EnforcementOutcome::Skipped`] and the run outcome is decided by the
/// scanner exit code alone.
///
/// # Arguments
/// * `report_path` - Absolute path of the JSON report file
/// * `threshold` - Maximum tolerated issue count; negative disables the gate
///
/// # Errors
///
/// [`EnforcementError::IssuesExceedThreshold`] when the tally is above the
/// threshold.
pub async fn enforce(
    report_path: &Utf8Path,
    threshold: i64,
) -> Result<EnforcementOutcome, EnforcementError> {
    let text = match tokio::fs::read_to_string(report_path.as_std_path()).await {
        Ok(text) => text,
        Err(err) => {
            return Ok(EnforcementOutcome::Skipped {
                reason: format!("failed to read report {report_path}: {err}"),
            });
        }
    };

    let report = match parse_report(&text) {
        Ok(report) => report,
        Err(err) => {
            return Ok(EnforcementOutcome::Skipped {
                reason: format!("failed to parse report as JSON: {err}"),
            });
        }
    };

    let found = total_issues(&report);
    tracing::info!("Issues found: {} (threshold {})", found, threshold);

    // The resolver never produces a negative threshold by default, so the
    // guard is defensive; a negative value disables the gate entirely.
    if threshold >= 0 && found as i64 > threshold {
        return Err(EnforcementError::IssuesExceedThreshold { found, threshold });
    }

    Ok(EnforcementOutcome::Passed { issues: found })
}
