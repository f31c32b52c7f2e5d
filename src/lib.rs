// pa11y-gate - CI gate around the pa11y-ci accessibility scanner.
//
// This is the library crate containing the run pipeline and its services.
// The binary crate (main.rs) provides the CI entry point.

pub mod ci;
pub mod config;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod workspace;

// Re-export commonly used types for convenience
pub use crate::config::resolve_inputs;
pub use models::{RawInputs, RunConfig};
pub use services::{ScanError, ScanResult, ScanService, ScannerCommand};
pub use workspace::RunContext;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
