//! Data models for the pa11y-gate run.
//!
//! This module contains the core data structures used throughout one
//! invocation:
//! - [`RawInputs`]: untyped CI inputs exactly as they arrive from `INPUT_*`
//!   environment variables
//! - [`RunConfig`]: the resolved, immutable configuration for the run
//! - [`AccessibilityReport`]: the parsed pa11y-ci JSON report mapping resource
//!   identifiers to issue arrays
//!
//! # Architecture Note
//!
//! `RunConfig` is built once by the input resolver and never mutated
//! afterwards; everything downstream (argument builder, process runner,
//! threshold enforcer) takes it by shared reference.

pub mod inputs;
pub mod report;

pub use inputs::{RawInputs, RunConfig};
pub use report::{AccessibilityReport, parse_report, total_issues};
