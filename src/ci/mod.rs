//! CI platform output and logging conventions.
//!
//! The host platform consumes two channels from a step:
//! - named outputs, appended as `name=value` lines to the file named by the
//!   `GITHUB_OUTPUT` variable (with a legacy `::set-output` workflow command
//!   printed when the variable is absent)
//! - workflow commands on standard output: `::error::` / `::warning::`
//!   annotations and `::group::` / `::endgroup::` collapsible log sections
//!
//! Our own stdout is the CI log; the scanner child's stdout goes to the
//! report file instead, so the two never interleave.

use anyhow::{Context, Result};
use std::env;
use std::fs::OpenOptions;
use std::io::Write;

/// Environment variable naming the file that receives step outputs.
pub const OUTPUT_FILE_VAR: &str = "GITHUB_OUTPUT";

/// Publish a named step output.
///
/// Values are expected to be single-line (paths, decimal exit codes); the
/// `name=value` file format cannot carry embedded newlines.
///
/// # Arguments
/// * `name` - Output name as declared by the step
/// * `value` - Single-line output value
///
/// # Errors
///
/// Fails when the output file cannot be opened or appended to.
pub fn set_output(name: &str, value: &str) -> Result<()> {
    match env::var(OUTPUT_FILE_VAR) {
        Ok(path) if !path.is_empty() => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open output file: {path}"))?;
            writeln!(file, "{name}={value}")
                .with_context(|| format!("Failed to append output `{name}` to {path}"))?;
        }
        _ => {
            // Legacy command form for runners without an output file.
            println!("::set-output name={}::{}", escape_property(name), escape_data(value));
        }
    }

    tracing::debug!("Published output {}={}", name, value);
    Ok(())
}

/// Emit an error-level annotation in the CI log.
pub fn error(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Emit a warning-level annotation in the CI log.
pub fn warning(message: &str) {
    println!("::warning::{}", escape_data(message));
}

/// Open a collapsible group in the CI log.
pub fn start_group(name: &str) {
    println!("::group::{}", escape_data(name));
}

/// Close the most recently opened log group.
pub fn end_group() {
    println!("::endgroup::");
}

/// Escape message data for a workflow command.
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a command property (names carry two extra reserved characters).
fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}
