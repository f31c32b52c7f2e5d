use indexmap::IndexMap;
use serde_json::Value;

/// Parsed pa11y-ci JSON report: resource identifier (usually a URL) mapped to
/// the issues recorded for it.
///
/// Only the length of array values is consumed; the shape of individual issue
/// entries does not matter to the gate. `IndexMap` keeps the scanner's key
/// order so logs list resources the way pa11y-ci emitted them.
pub type AccessibilityReport = IndexMap<String, Value>;

/// Parse report text into an [`AccessibilityReport`].
///
/// Tries a direct parse of the full text first. Some tool configurations
/// emit banner or log lines before the JSON body, so on failure the text is
/// re-parsed from the first `{` onward. This fallback is best-effort: it does
/// not handle braces embedded in arbitrary log text, and it is not meant to.
///
/// # Errors
///
/// Returns the parse error when the text is not valid JSON even after
/// banner trimming.
pub fn parse_report(text: &str) -> Result<AccessibilityReport, serde_json::Error> {
    match serde_json::from_str(text) {
        Ok(report) => Ok(report),
        Err(direct_err) => match text.find('{') {
            Some(start) => serde_json::from_str(text[start..].trim()),
            None => Err(direct_err),
        },
    }
}

/// Total issue count across every resource in the report.
///
/// Non-array values contribute zero; a malformed per-resource entry must not
/// abort the tally.
pub fn total_issues(report: &AccessibilityReport) -> usize {
    report
        .values()
        .map(|entry| entry.as_array().map_or(0, |issues| issues.len()))
        .sum()
}
