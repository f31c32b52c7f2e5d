use serde::{Deserialize, Serialize};

/// Default accessibility standard passed to pa11y-ci.
pub const DEFAULT_STANDARD: &str = "WCAG2AA";

/// Default reporter requested from pa11y-ci.
pub const DEFAULT_REPORTER: &str = "json";

/// Default report file name, resolved against the workspace root.
pub const DEFAULT_REPORT_FILE: &str = "pa11y-report.json";

/// Default wait value; `"0"` means the `--wait` flag is omitted entirely.
pub const DEFAULT_WAIT: &str = "0";

/// Raw CI inputs exactly as they arrive from the environment.
///
/// Every field is optional because the CI platform passes inputs as plain
/// `INPUT_*` string variables that may be absent or empty. Defaults and
/// normalization happen in [`RunConfig::from_raw`], not here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInputs {
    pub url: Option<String>,
    pub config: Option<String>,
    pub standard: Option<String>,
    pub threshold: Option<String>,
    pub wait: Option<String>,
    pub headers: Option<String>,
    pub reporter: Option<String>,
    pub report_file: Option<String>,
    pub extra_args: Option<String>,
}

/// Resolved run configuration, immutable for the rest of the invocation.
///
/// At least one of `url` and `config` must be present by the time scanner
/// arguments are built; `config` wins when both are set. That rule is
/// enforced by the argument builder rather than here so the failure happens
/// before any process is spawned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    /// Target URL to scan (`--url`). Ignored when `config` is set.
    pub url: Option<String>,

    /// Path to a pa11y-ci configuration file (`--config`).
    pub config: Option<String>,

    /// Accessibility standard (`--standard`).
    pub standard: String,

    /// Maximum tolerated issue count. Negative values disable enforcement.
    pub threshold: i64,

    /// Milliseconds to wait before testing; `"0"` omits the flag.
    pub wait: String,

    /// JSON-encoded request headers (`--headers`).
    pub headers: Option<String>,

    /// Output format requested from the scanner (`--reporter`).
    pub reporter: String,

    /// Report file name, resolved against the workspace root.
    pub report_file: String,

    /// Raw whitespace-delimited extra tokens appended after all flags.
    pub extra_args: Option<String>,
}

impl RunConfig {
    /// Normalize raw CI inputs into a resolved configuration.
    ///
    /// Values are trimmed and empty strings are treated as unset before
    /// defaults apply. An unparsable threshold falls back to the default of 0
    /// with a warning rather than failing the run.
    pub fn from_raw(raw: RawInputs) -> Self {
        let threshold = match clean(raw.threshold) {
            Some(value) => match value.parse::<i64>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    tracing::warn!("Ignoring unparsable `threshold` input {:?}, using 0", value);
                    0
                }
            },
            None => 0,
        };

        Self {
            url: clean(raw.url),
            config: clean(raw.config),
            standard: clean(raw.standard).unwrap_or_else(|| DEFAULT_STANDARD.to_string()),
            threshold,
            wait: clean(raw.wait).unwrap_or_else(|| DEFAULT_WAIT.to_string()),
            headers: clean(raw.headers),
            reporter: clean(raw.reporter).unwrap_or_else(|| DEFAULT_REPORTER.to_string()),
            report_file: clean(raw.report_file).unwrap_or_else(|| DEFAULT_REPORT_FILE.to_string()),
            extra_args: clean(raw.extra_args),
        }
    }

    /// Copy of the configuration safe to print in the CI log.
    ///
    /// `headers` may carry credentials (cookies, authorization tokens), so
    /// its value is replaced with a `[set]` marker.
    pub fn redacted(&self) -> Self {
        Self {
            headers: self.headers.as_ref().map(|_| "[set]".to_string()),
            ..self.clone()
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_when_inputs_absent() {
        let config = RunConfig::from_raw(RawInputs::default());

        assert_eq!(config.url, None);
        assert_eq!(config.config, None);
        assert_eq!(config.standard, "WCAG2AA");
        assert_eq!(config.threshold, 0);
        assert_eq!(config.wait, "0");
        assert_eq!(config.headers, None);
        assert_eq!(config.reporter, "json");
        assert_eq!(config.report_file, "pa11y-report.json");
        assert_eq!(config.extra_args, None);
    }

    #[test]
    fn test_empty_and_whitespace_inputs_treated_as_unset() {
        let raw = RawInputs {
            url: Some("  ".to_string()),
            standard: Some(String::new()),
            reporter: Some("   ".to_string()),
            ..RawInputs::default()
        };
        let config = RunConfig::from_raw(raw);

        assert_eq!(config.url, None);
        assert_eq!(config.standard, "WCAG2AA");
        assert_eq!(config.reporter, "json");
    }

    #[test]
    fn test_values_trimmed() {
        let raw = RawInputs {
            url: Some("  https://example.com  ".to_string()),
            wait: Some(" 5000 ".to_string()),
            ..RawInputs::default()
        };
        let config = RunConfig::from_raw(raw);

        assert_eq!(config.url.as_deref(), Some("https://example.com"));
        assert_eq!(config.wait, "5000");
    }

    #[test]
    fn test_threshold_parsed() {
        let raw = RawInputs {
            threshold: Some("12".to_string()),
            ..RawInputs::default()
        };
        assert_eq!(RunConfig::from_raw(raw).threshold, 12);
    }

    #[test]
    fn test_negative_threshold_preserved() {
        // A negative threshold disables enforcement downstream; the resolver
        // passes it through untouched.
        let raw = RawInputs {
            threshold: Some("-1".to_string()),
            ..RawInputs::default()
        };
        assert_eq!(RunConfig::from_raw(raw).threshold, -1);
    }

    #[test]
    fn test_unparsable_threshold_falls_back_to_zero() {
        let raw = RawInputs {
            threshold: Some("lots".to_string()),
            ..RawInputs::default()
        };
        assert_eq!(RunConfig::from_raw(raw).threshold, 0);
    }

    #[test]
    fn test_redacted_masks_headers_only() {
        let raw = RawInputs {
            url: Some("https://example.com".to_string()),
            headers: Some("{\"Authorization\":\"Bearer secret\"}".to_string()),
            ..RawInputs::default()
        };
        let config = RunConfig::from_raw(raw);
        let redacted = config.redacted();

        assert_eq!(redacted.headers.as_deref(), Some("[set]"));
        assert_eq!(redacted.url, config.url);
        assert_eq!(redacted.threshold, config.threshold);
    }

    #[test]
    fn test_redacted_keeps_unset_headers_unset() {
        let config = RunConfig::from_raw(RawInputs::default());
        assert_eq!(config.redacted().headers, None);
    }
}
