//! Raw Pyright JSON → [`CheckResult`]
//!
//! Pyright's `--outputjson` document is read field by field, each with its own
//! default, instead of being deserialized wholesale. A missing or mistyped
//! field never fails the transform:
//!
//! | Field                    | Default                |
//! |--------------------------|------------------------|
//! | `summary.*` counts       | `0`                    |
//! | `summary.timeInSec`      | `0.0`                  |
//! | diagnostic `severity`    | `"error"`              |
//! | diagnostic `message`     | `""`                   |
//! | diagnostic `rule`        | absent                 |
//! | diagnostic `range`       | `{0,0}`-`{0,0}`        |
//! | `version`                | absent                 |
//!
//! Diagnostics without a non-empty `file` (project-level messages) are dropped.

use crate::model::{
    CheckResult, Diagnostic, DiagnosticPosition, DiagnosticRange, Summary,
};
use crate::paginate::paginate;
use serde_json::{Map, Value};
use std::num::NonZeroUsize;
use tracing::debug;

const DEFAULT_SEVERITY: &str = "error";

/// Transform raw Pyright output into a paginated, typed result.
///
/// The summary is copied from the raw document and is unaffected by dropped
/// diagnostics. Surviving diagnostics keep their input order.
pub fn transform_pyright_output(
    raw: &Map<String, Value>,
    page: i64,
    page_size: NonZeroUsize,
) -> CheckResult {
    let summary = read_summary(raw.get("summary"));

    let raw_diagnostics = raw
        .get("generalDiagnostics")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let diagnostics: Vec<Diagnostic> = raw_diagnostics.iter().filter_map(read_diagnostic).collect();

    let dropped = raw_diagnostics.len() - diagnostics.len();
    if dropped > 0 {
        debug!("Dropped {} diagnostics without a file association", dropped);
    }

    let (page_diagnostics, pagination) = paginate(diagnostics, page, page_size);

    CheckResult {
        summary,
        diagnostics: page_diagnostics,
        version: read_string(raw, "version"),
        pagination: Some(pagination),
    }
}

fn read_summary(value: Option<&Value>) -> Summary {
    let Some(raw) = value.and_then(Value::as_object) else {
        return Summary::default();
    };

    Summary {
        files_analyzed: read_count(raw, "filesAnalyzed"),
        error_count: read_count(raw, "errorCount"),
        warning_count: read_count(raw, "warningCount"),
        information_count: read_count(raw, "informationCount"),
        time_in_sec: raw
            .get("timeInSec")
            .and_then(Value::as_f64)
            .filter(|t| t.is_finite() && *t >= 0.0)
            .unwrap_or(0.0),
    }
}

fn read_diagnostic(value: &Value) -> Option<Diagnostic> {
    let raw = value.as_object()?;
    let file = read_string(raw, "file").filter(|f| !f.is_empty())?;

    Some(Diagnostic {
        file,
        severity: read_string(raw, "severity").unwrap_or_else(|| DEFAULT_SEVERITY.to_string()),
        message: read_string(raw, "message").unwrap_or_default(),
        rule: read_string(raw, "rule"),
        range: read_range(raw.get("range")),
    })
}

fn read_range(value: Option<&Value>) -> DiagnosticRange {
    let Some(raw) = value.and_then(Value::as_object) else {
        return DiagnosticRange::default();
    };

    DiagnosticRange {
        start: read_position(raw.get("start")),
        end: read_position(raw.get("end")),
    }
}

fn read_position(value: Option<&Value>) -> DiagnosticPosition {
    let Some(raw) = value.and_then(Value::as_object) else {
        return DiagnosticPosition::default();
    };

    DiagnosticPosition {
        line: read_u32(raw, "line"),
        character: read_u32(raw, "character"),
    }
}

fn read_string(raw: &Map<String, Value>, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn read_count(raw: &Map<String, Value>, key: &str) -> u64 {
    raw.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn read_u32(raw: &Map<String, Value>, key: &str) -> u32 {
    raw.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}
