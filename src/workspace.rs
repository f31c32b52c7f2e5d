//! Run context: workspace root resolution and the scoped scratch directory.
//!
//! The scratch directory used to be handed between separate setup and
//! cleanup steps through a process-environment side channel. Here it is
//! owned by the [`RunContext`] instead: acquired when the context is created
//! and removed when it drops, on every exit path. The scanner child still
//! sees the path, but through its own spawned environment rather than a
//! mutation of ours.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::fs;

/// CI variable naming the checked-out workspace root.
pub const WORKSPACE_VAR: &str = "GITHUB_WORKSPACE";

/// Name of the scratch directory created under the workspace root.
pub const SCRATCH_DIR_NAME: &str = ".pa11y-tmp";

/// Per-invocation context: the workspace root and a scratch directory that
/// lives exactly as long as the context does.
#[derive(Debug)]
pub struct RunContext {
    workspace_root: Utf8PathBuf,
    scratch: ScratchDir,
}

impl RunContext {
    /// Acquire a run context from the CI environment.
    ///
    /// The workspace root comes from `GITHUB_WORKSPACE`, falling back to the
    /// current working directory when the variable is unset or empty.
    pub fn acquire() -> Result<Self> {
        Self::with_root(workspace_root_from_env()?)
    }

    /// Acquire a run context rooted at an explicit directory.
    ///
    /// # Arguments
    /// * `workspace_root` - Absolute directory that relative report paths
    ///   resolve against
    pub fn with_root(workspace_root: Utf8PathBuf) -> Result<Self> {
        let scratch = ScratchDir::create(workspace_root.join(SCRATCH_DIR_NAME))?;
        Ok(Self {
            workspace_root,
            scratch,
        })
    }

    /// The workspace root directory.
    pub fn workspace_root(&self) -> &Utf8Path {
        &self.workspace_root
    }

    /// The scratch directory, removed when this context drops.
    pub fn scratch_dir(&self) -> &Utf8Path {
        self.scratch.path()
    }

    /// Resolve the report file name to an absolute path.
    ///
    /// Relative names resolve against the workspace root; absolute names
    /// pass through untouched.
    pub fn resolve_report_path(&self, report_file: &str) -> Utf8PathBuf {
        let candidate = Utf8Path::new(report_file);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.workspace_root.join(candidate)
        }
    }
}

/// Scratch directory with scoped lifetime: created on construction, removed
/// recursively on drop.
#[derive(Debug)]
struct ScratchDir {
    path: Utf8PathBuf,
}

impl ScratchDir {
    fn create(path: Utf8PathBuf) -> Result<Self> {
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create scratch directory: {path}"))?;
        tracing::debug!("Created scratch directory: {}", path);
        Ok(Self { path })
    }

    fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        // Cleanup failure must never fail the run
        match fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::info!("Removed {}", self.path),
            Err(err) => tracing::warn!("Failed to remove scratch directory {}: {}", self.path, err),
        }
    }
}

fn workspace_root_from_env() -> Result<Utf8PathBuf> {
    let cwd = Utf8PathBuf::try_from(
        env::current_dir().context("Failed to resolve current directory")?,
    )
    .context("Current directory is not valid UTF-8")?;

    match env::var(WORKSPACE_VAR) {
        Ok(root) if !root.trim().is_empty() => {
            let root = Utf8PathBuf::from(root);
            // The platform sets an absolute path; tolerate a relative one anyway
            if root.is_absolute() {
                Ok(root)
            } else {
                Ok(cwd.join(root))
            }
        }
        _ => Ok(cwd),
    }
}
