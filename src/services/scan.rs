use crate::models::RunConfig;
use camino::{Utf8Path, Utf8PathBuf};
use std::process::Stdio;
use std::time::Instant;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Environment variable overriding the JavaScript runtime used to invoke the
/// scanner entry script.
pub const NODE_RUNTIME_VAR: &str = "PA11Y_GATE_NODE";

/// Environment variable naming the pa11y-ci entry script. When unset, the
/// `pa11y-ci` executable is looked up on `PATH` instead.
pub const SCANNER_SCRIPT_VAR: &str = "PA11Y_GATE_SCRIPT";

/// Variable under which the scratch directory is exposed to the scanner.
pub const SCRATCH_ENV_VAR: &str = "PA11Y_TMPDIR";

const DEFAULT_RUNTIME: &str = "node";
const DEFAULT_SCANNER_BIN: &str = "pa11y-ci";

/// Result of one scanner execution
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Scanner exit code; signal-killed processes report 1, never 0
    pub exit_code: i32,
    /// Absolute path of the report file the scanner's stdout was written to
    pub report_path: Utf8PathBuf,
    /// Captured standard error, possibly empty
    pub stderr: String,
}

/// Errors raised while building scanner arguments or running the scanner
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("you must provide either `url` or `config` input")]
    MissingTarget,

    #[error("failed to spawn scanner `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("scanner I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the scanner process is invoked: a program plus the arguments that
/// come before the per-run argument list.
///
/// pa11y-ci ships as a Node package, so the usual invocation is
/// `node <path-to-pa11y-ci-bin> <args...>`. When no entry script is
/// configured the `pa11y-ci` executable on `PATH` is run directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerCommand {
    program: Utf8PathBuf,
    leading_args: Vec<String>,
}

impl ScannerCommand {
    /// Create a scanner command from an explicit program and leading
    /// arguments.
    pub fn new<P: Into<Utf8PathBuf>>(program: P, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    /// Resolve the scanner invocation from the environment.
    ///
    /// `PA11Y_GATE_SCRIPT` selects the runtime-plus-entry-script form, with
    /// the runtime taken from `PA11Y_GATE_NODE` (default `node`). Without a
    /// script, `pa11y-ci` is expected on `PATH`.
    pub fn from_env() -> Self {
        match std::env::var(SCANNER_SCRIPT_VAR) {
            Ok(script) if !script.trim().is_empty() => {
                let runtime = std::env::var(NODE_RUNTIME_VAR)
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_RUNTIME.to_string());
                Self::new(runtime, vec![script])
            }
            _ => Self::new(DEFAULT_SCANNER_BIN, Vec::new()),
        }
    }

    /// The program that will be spawned.
    pub fn program(&self) -> &Utf8Path {
        &self.program
    }

    /// Human-readable form for logging.
    pub fn describe(&self) -> String {
        if self.leading_args.is_empty() {
            self.program.to_string()
        } else {
            format!("{} {}", self.program, self.leading_args.join(" "))
        }
    }
}

/// Service for running pa11y-ci scans.
///
/// Handles the two halves of one scan: translating a [`RunConfig`] into the
/// scanner's command-line argument list, and executing the scanner as a
/// child process with its stdout streamed into the report file.
///
/// # Design Philosophy
///
/// - **Stateless**: all operations take explicit parameters; no hidden state
/// - **Testable**: argument building is pure, execution takes an arbitrary
///   [`ScannerCommand`] so tests can substitute a shell script
/// - **Async**: uses tokio for non-blocking subprocess execution and file I/O
pub struct ScanService {
    scanner: ScannerCommand,
}

impl ScanService {
    /// Create a new ScanService around the given scanner invocation
    pub fn new(scanner: ScannerCommand) -> Self {
        Self { scanner }
    }

    /// Build the scanner argument list from the resolved configuration.
    ///
    /// Argument order is part of the compatibility contract: config-or-url,
    /// standard, wait, headers, reporter, then raw extra tokens.
    ///
    /// # Errors
    ///
    /// [`ScanError::MissingTarget`] when neither `url` nor `config` is set;
    /// the caller must not spawn anything in that case.
    pub fn build_args(&self, config: &RunConfig) -> Result<Vec<String>, ScanError> {
        let mut args: Vec<String> = Vec::new();

        match (&config.config, &config.url) {
            (Some(config_path), url) => {
                if url.is_some() {
                    tracing::warn!(
                        "Both `url` and `config` inputs are set; `config` takes precedence and `url` is ignored"
                    );
                }
                args.push("--config".to_string());
                args.push(config_path.clone());
            }
            (None, Some(url)) => {
                args.push("--url".to_string());
                args.push(url.clone());
            }
            (None, None) => return Err(ScanError::MissingTarget),
        }

        if !config.standard.is_empty() {
            args.push("--standard".to_string());
            args.push(config.standard.clone());
        }

        // "0" means "no wait configured", not "wait zero milliseconds"
        if !config.wait.is_empty() && config.wait != "0" {
            args.push("--wait".to_string());
            args.push(config.wait.clone());
        }

        if let Some(headers) = &config.headers {
            args.push("--headers".to_string());
            args.push(headers.clone());
        }

        if !config.reporter.is_empty() {
            args.push("--reporter".to_string());
            args.push(config.reporter.clone());
        }

        // Naive whitespace split. Tokens with embedded spaces cannot be
        // represented; the flat split is a compatibility contract with
        // existing step configurations, not something to fix with quoting.
        if let Some(extra) = &config.extra_args {
            args.extend(extra.split_whitespace().map(str::to_string));
        }

        Ok(args)
    }

    /// Execute the scanner and wait for it to terminate.
    ///
    /// stdin is closed; stdout is streamed unbuffered into a newly created
    /// (truncating) file at `report_path`; stderr is accumulated in memory
    /// without an upper bound, on the assumption that scanner error output
    /// stays small. The stdout copy, the stderr read, and the process wait
    /// are joined, so the report file is complete before this returns.
    ///
    /// # Arguments
    /// * `args` - Argument list from [`Self::build_args`]
    /// * `report_path` - Absolute destination for the scanner's stdout
    /// * `scratch_dir` - Optional scratch directory handed to the child as
    ///   `PA11Y_TMPDIR`
    ///
    /// # Returns
    /// The [`ScanResult`] with the exit code (1 when signal-killed) and the
    /// captured stderr
    pub async fn run(
        &self,
        args: &[String],
        report_path: &Utf8Path,
        scratch_dir: Option<&Utf8Path>,
    ) -> Result<ScanResult, ScanError> {
        let mut command = Command::new(self.scanner.program.as_std_path());
        command
            .args(&self.scanner.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = scratch_dir {
            command.env(SCRATCH_ENV_VAR, dir.as_str());
        }

        tracing::info!("Executing: {} {}", self.scanner.describe(), args.join(" "));

        let start = Instant::now();
        let mut child = command.spawn().map_err(|source| ScanError::Spawn {
            program: self.scanner.program.to_string(),
            source,
        })?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ScanError::Io(std::io::Error::other("scanner stdout not captured")))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ScanError::Io(std::io::Error::other("scanner stderr not captured")))?;

        let mut report_file = tokio::fs::File::create(report_path.as_std_path()).await?;
        let mut stderr_buf = String::new();

        // Join, not race: the report file is only complete once stdout hits
        // EOF, and a short-lived child must not truncate it.
        let stdout_copy = async {
            let bytes = tokio::io::copy(&mut stdout, &mut report_file).await?;
            report_file.flush().await?;
            Ok::<u64, std::io::Error>(bytes)
        };
        let stderr_read = stderr.read_to_string(&mut stderr_buf);
        let (copied, stderr_read, status) = tokio::join!(stdout_copy, stderr_read, child.wait());

        let copied = copied?;
        stderr_read?;
        let status = status?;

        // A process killed by a signal has no code; that is a failure
        let exit_code = status.code().unwrap_or(1);

        tracing::info!(
            "Scanner completed in {:.2}s with exit code {} ({} report bytes)",
            start.elapsed().as_secs_f32(),
            exit_code,
            copied
        );

        Ok(ScanResult {
            exit_code,
            report_path: report_path.to_path_buf(),
            stderr: stderr_buf,
        })
    }
}
