use crate::models::{RawInputs, RunConfig};
use anyhow::{Context, Result};
// Global path: `config` alone would be ambiguous with this module
use ::config::{Config, Environment};

/// Prefix for CI input variables: input `report_file` arrives as
/// `INPUT_REPORT_FILE`.
pub const INPUT_PREFIX: &str = "INPUT";

/// Resolve the run configuration from CI input variables.
///
/// The CI platform passes each declared input to the step as an `INPUT_*`
/// environment variable, always string-valued and possibly empty. They are
/// collected through an [`Environment`] source, deserialized into
/// [`RawInputs`], then normalized into a [`RunConfig`] with defaults applied
/// (see [`RunConfig::from_raw`]).
///
/// # Returns
/// The resolved configuration for this run
///
/// # Errors
///
/// Fails only when the environment source itself cannot be read; missing or
/// empty inputs are not errors at this stage. The url/config requirement is
/// checked later by the argument builder so that failure aborts the run
/// before any process is spawned.
pub fn resolve_inputs() -> Result<RunConfig> {
    let source = Config::builder()
        .add_source(Environment::with_prefix(INPUT_PREFIX))
        .build()
        .context("Failed to read CI inputs from the environment")?;

    let raw: RawInputs = source
        .try_deserialize()
        .context("Failed to deserialize CI inputs")?;

    let config = RunConfig::from_raw(raw);
    tracing::debug!(
        "Resolved inputs - reporter: {}, threshold: {}, report_file: {}",
        config.reporter,
        config.threshold,
        config.report_file
    );

    Ok(config)
}
