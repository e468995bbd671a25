//! Typed diagnostic model returned to callers.
//!
//! Every value here is built fresh per invocation and never mutated afterwards.
//! Field names on the wire follow Pyright for `summary` (camelCase) and keep
//! snake_case for pagination metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum severity requested from Pyright (`--level=`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Error,
    #[default]
    Warning,
    Information,
}

impl SeverityLevel {
    pub const ALL: [SeverityLevel; 3] = [
        SeverityLevel::Error,
        SeverityLevel::Warning,
        SeverityLevel::Information,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Error => "error",
            SeverityLevel::Warning => "warning",
            SeverityLevel::Information => "information",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(SeverityLevel::Error),
            "warning" => Ok(SeverityLevel::Warning),
            "information" => Ok(SeverityLevel::Information),
            other => Err(format!(
                "Invalid severity level '{}': expected one of error, warning, information",
                other
            )),
        }
    }
}

/// Zero-based point in a source file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticPosition {
    pub line: u32,
    pub character: u32,
}

impl DiagnosticPosition {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Span a diagnostic covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRange {
    pub start: DiagnosticPosition,
    pub end: DiagnosticPosition,
}

/// Single diagnostic reported by Pyright.
///
/// `file` is never empty: entries without a file are dropped before a
/// `Diagnostic` is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub severity: String,
    pub message: String,
    pub rule: Option<String>,
    pub range: DiagnosticRange,
}

/// Summary statistics, copied from Pyright rather than recomputed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub files_analyzed: u64,
    pub error_count: u64,
    pub warning_count: u64,
    pub information_count: u64,
    pub time_in_sec: f64,
}

/// Pagination metadata describing the full diagnostic list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total_diagnostics: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// Complete, paginated result of one type-check run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub summary: Summary,
    /// Current page only
    pub diagnostics: Vec<Diagnostic>,
    pub version: Option<String>,
    pub pagination: Option<PaginationInfo>,
}

impl CheckResult {
    /// One-line human summary, as reported through progress notifications.
    pub fn summary_line(&self) -> String {
        let summary = &self.summary;
        let pagination_msg = match &self.pagination {
            Some(p) => format!(
                " - Page {}/{} ({} of {} diagnostics)",
                p.current_page,
                p.total_pages,
                self.diagnostics.len(),
                p.total_diagnostics
            ),
            None => String::new(),
        };

        format!(
            "Analysis complete: {} errors, {} warnings, {} info messages ({} files in {:.2}s){}",
            summary.error_count,
            summary.warning_count,
            summary.information_count,
            summary.files_analyzed,
            summary.time_in_sec,
            pagination_msg
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse() {
        assert_eq!("error".parse::<SeverityLevel>().unwrap(), SeverityLevel::Error);
        assert_eq!(" Warning ".parse::<SeverityLevel>().unwrap(), SeverityLevel::Warning);
        assert_eq!(
            "INFORMATION".parse::<SeverityLevel>().unwrap(),
            SeverityLevel::Information
        );
        assert!("info".parse::<SeverityLevel>().is_err());
        assert_eq!(SeverityLevel::default(), SeverityLevel::Warning);
    }

    #[test]
    fn test_summary_uses_pyright_field_names() {
        let summary = Summary {
            files_analyzed: 3,
            error_count: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["filesAnalyzed"], 3);
        assert_eq!(json["errorCount"], 1);
        assert_eq!(json["timeInSec"], 0.0);
    }

    #[test]
    fn test_result_serialization_shape() {
        let result = CheckResult {
            summary: Summary::default(),
            diagnostics: vec![Diagnostic {
                file: "/app/code/main.py".to_string(),
                severity: "error".to_string(),
                message: "boom".to_string(),
                rule: None,
                range: DiagnosticRange {
                    start: DiagnosticPosition::new(1, 2),
                    end: DiagnosticPosition::new(1, 8),
                },
            }],
            version: Some("1.1.380".to_string()),
            pagination: Some(PaginationInfo {
                current_page: 1,
                total_pages: 1,
                page_size: 50,
                total_diagnostics: 1,
                has_next_page: false,
                has_previous_page: false,
            }),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["diagnostics"][0]["range"]["start"]["character"], 2);
        assert_eq!(json["diagnostics"][0]["rule"], serde_json::Value::Null);
        assert_eq!(json["pagination"]["total_diagnostics"], 1);
        assert_eq!(json["pagination"]["has_next_page"], false);
    }

    #[test]
    fn test_summary_line() {
        let result = CheckResult {
            summary: Summary {
                files_analyzed: 4,
                error_count: 2,
                warning_count: 1,
                information_count: 0,
                time_in_sec: 1.234,
            },
            diagnostics: Vec::new(),
            version: None,
            pagination: Some(PaginationInfo {
                current_page: 2,
                total_pages: 2,
                page_size: 2,
                total_diagnostics: 3,
                has_next_page: false,
                has_previous_page: true,
            }),
        };

        assert_eq!(
            result.summary_line(),
            "Analysis complete: 2 errors, 1 warnings, 0 info messages (4 files in 1.23s) - Page 2/2 (0 of 3 diagnostics)"
        );
    }
}
