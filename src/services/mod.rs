//! Services module - the business logic of one gate run.
//!
//! The services are **framework-agnostic**: no CI-protocol code lives here,
//! only argument construction, subprocess execution, and report evaluation.
//! The pipeline layer wires them to the CI output conventions.
//!
//! # Components
//!
//! - [`ScanService`]: builds the pa11y-ci argument list from a resolved
//!   [`RunConfig`](crate::models::RunConfig) and executes the scanner with
//!   stdout streamed to the report file and stderr captured in memory
//! - [`enforcement`]: decides whether a JSON report's issue tally is within
//!   the configured threshold, degrading to exit-code-only semantics when
//!   the report cannot be parsed
//!
//! # Design Philosophy
//!
//! - **Pure where possible**: argument building and tallying have no side
//!   effects; only scanner execution touches the filesystem
//! - **Async**: subprocess and report I/O go through tokio
//! - **Testable**: the scanner invocation is an explicit parameter, so tests
//!   substitute a shell script for the real pa11y-ci

pub mod enforcement;
pub mod scan;

pub use enforcement::{EnforcementError, EnforcementOutcome, applies, enforce};
pub use scan::{ScanError, ScanResult, ScanService, ScannerCommand};
