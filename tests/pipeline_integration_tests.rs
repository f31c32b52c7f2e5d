//! End-to-end tests for the run pipeline
//!
//! These tests verify:
//! - Output publication (`report_path`, `exit_code`) on pass and fail paths
//! - Threshold enforcement wiring, including banner recovery and the
//!   non-fatal parse-failure path
//! - Hard failure on scanner non-zero exit, independent of the report body
//! - MissingTarget aborting before any process is spawned
//!
//! The scanner is a `/bin/sh` script; the step-output file is a temp file
//! wired in through `GITHUB_OUTPUT`, so every test takes the environment
//! lock.

use camino::Utf8PathBuf;
use pa11y_gate::pipeline::{self, PipelineError};
use pa11y_gate::services::{EnforcementError, ScanError, ScanService, ScannerCommand};
use pa11y_gate::workspace::RunContext;
use pa11y_gate::{RawInputs, RunConfig};
use std::sync::{Mutex, MutexGuard, OnceLock};
use tempfile::{NamedTempFile, TempDir};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Fixture {
    _workspace: TempDir,
    ctx: RunContext,
    output_file: NamedTempFile,
}

impl Fixture {
    fn new() -> Self {
        let workspace = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(workspace.path().to_path_buf()).unwrap();
        let ctx = RunContext::with_root(root).unwrap();

        let output_file = NamedTempFile::new().unwrap();
        // SAFETY: environment mutation only happens under ENV_LOCK, held by
        // every test in this binary for its full duration.
        unsafe { std::env::set_var("GITHUB_OUTPUT", output_file.path()) };

        Self {
            _workspace: workspace,
            ctx,
            output_file,
        }
    }

    fn outputs(&self) -> String {
        std::fs::read_to_string(self.output_file.path()).unwrap()
    }

    fn report_contents(&self) -> String {
        std::fs::read_to_string(self.ctx.resolve_report_path("pa11y-report.json")).unwrap()
    }
}

fn shell_scanner(script: &str) -> ScanService {
    ScanService::new(ScannerCommand::new(
        "/bin/sh",
        vec!["-c".to_string(), script.to_string(), "pa11y-ci".to_string()],
    ))
}

fn config_with(f: impl FnOnce(&mut RawInputs)) -> RunConfig {
    let mut raw = RawInputs {
        url: Some("https://example.com".to_string()),
        ..RawInputs::default()
    };
    f(&mut raw);
    RunConfig::from_raw(raw)
}

#[tokio::test]
async fn test_pass_when_tally_within_threshold() {
    let _guard = env_lock();
    let fixture = Fixture::new();

    let service = shell_scanner(r#"printf '{"http://a":[{"code":"x"}],"http://b":[]}'"#);
    let config = config_with(|raw| raw.threshold = Some("5".to_string()));

    pipeline::execute(&service, &config, &fixture.ctx)
        .await
        .unwrap();

    let outputs = fixture.outputs();
    assert!(outputs.contains("exit_code=0"));
    assert!(outputs.contains("report_path="));
    assert!(outputs.contains("pa11y-report.json"));
    assert_eq!(
        fixture.report_contents(),
        r#"{"http://a":[{"code":"x"}],"http://b":[]}"#
    );
}

#[tokio::test]
async fn test_threshold_exceeded_fails_with_tally() {
    let _guard = env_lock();
    let fixture = Fixture::new();

    let service = shell_scanner(r#"printf '{"http://a":[1,2],"http://b":[]}'"#);
    let config = config_with(|raw| raw.threshold = Some("1".to_string()));

    let err = pipeline::execute(&service, &config, &fixture.ctx)
        .await
        .unwrap_err();

    match err.downcast_ref::<EnforcementError>() {
        Some(EnforcementError::IssuesExceedThreshold { found, threshold }) => {
            assert_eq!(*found, 2);
            assert_eq!(*threshold, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Outputs are published even though the run failed
    let outputs = fixture.outputs();
    assert!(outputs.contains("exit_code=0"));
    assert!(outputs.contains("report_path="));
}

#[tokio::test]
async fn test_banner_report_recovered_before_enforcement() {
    let _guard = env_lock();
    let fixture = Fixture::new();

    let service = shell_scanner(r#"printf 'LOG BANNER\n{"http://a":[1,2]}'"#);
    let config = config_with(|raw| raw.threshold = Some("1".to_string()));

    let err = pipeline::execute(&service, &config, &fixture.ctx)
        .await
        .unwrap_err();

    // Enforcement saw through the banner and tallied both issues
    match err.downcast_ref::<EnforcementError>() {
        Some(EnforcementError::IssuesExceedThreshold { found, .. }) => assert_eq!(*found, 2),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_scanner_failure_skips_enforcement() {
    let _guard = env_lock();
    let fixture = Fixture::new();

    // The report body alone would exceed threshold 0, but the non-zero exit
    // must fail the run on its own
    let service = shell_scanner(r#"printf '{"http://a":[1,2,3]}'; echo boom >&2; exit 2"#);
    let config = config_with(|raw| raw.threshold = Some("0".to_string()));

    let err = pipeline::execute(&service, &config, &fixture.ctx)
        .await
        .unwrap_err();

    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::ScannerNonZeroExit(code)) => assert_eq!(*code, 2),
        other => panic!("unexpected error: {other:?}"),
    }

    let outputs = fixture.outputs();
    assert!(outputs.contains("exit_code=2"));
}

#[tokio::test]
async fn test_unparsable_report_degrades_to_exit_code() {
    let _guard = env_lock();
    let fixture = Fixture::new();

    let service = shell_scanner("printf 'not json at all'");
    let config = config_with(|raw| raw.threshold = Some("0".to_string()));

    // Parse failure is a warning; exit 0 means the run passes
    pipeline::execute(&service, &config, &fixture.ctx)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_non_json_reporter_never_parsed() {
    let _guard = env_lock();
    let fixture = Fixture::new();

    let service = shell_scanner(r#"printf '{"http://a":[1,2,3]}'"#);
    let config = config_with(|raw| {
        raw.reporter = Some("csv".to_string());
        raw.threshold = Some("0".to_string());
    });

    // Three issues in the body, threshold 0 - but enforcement never runs
    pipeline::execute(&service, &config, &fixture.ctx)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_target_aborts_before_spawn() {
    let _guard = env_lock();
    let fixture = Fixture::new();

    // A scanner that would leave a marker if it ever ran
    let service = shell_scanner("printf 'scanner ran'");
    let config = RunConfig::from_raw(RawInputs::default());

    let err = pipeline::execute(&service, &config, &fixture.ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ScanError>(),
        Some(ScanError::MissingTarget)
    ));
    assert!(!fixture.ctx.resolve_report_path("pa11y-report.json").exists());
    assert_eq!(fixture.outputs(), "");
}

#[tokio::test]
async fn test_custom_report_file_resolved_against_workspace() {
    let _guard = env_lock();
    let fixture = Fixture::new();

    let service = shell_scanner("printf '{}'");
    let config = config_with(|raw| raw.report_file = Some("custom-report.json".to_string()));

    pipeline::execute(&service, &config, &fixture.ctx)
        .await
        .unwrap();

    let expected = fixture.ctx.resolve_report_path("custom-report.json");
    assert!(expected.is_absolute());
    assert!(expected.exists());
    assert!(fixture.outputs().contains(&format!("report_path={expected}")));
}
