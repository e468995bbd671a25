//! `run_type_check`: the full analysis pipeline.
//!
//! discovery → Pyright → transform → paginate, with progress reported at
//! 0.3 (analysis started), 0.8 (processing) and 1.0 (complete).

use async_trait::async_trait;
use pyright_hand_core::{
    resolve_root, transform_pyright_output, AnalysisRunner, CheckError, CheckResult,
    SeverityLevel, DEFAULT_PAGE_SIZE,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use super::{discover, parse_args};
use crate::progress::ProgressReporter;
use crate::types::{Tool, ToolError, ToolInputSchema, ToolResult};

#[derive(Debug, Default, Deserialize)]
struct RunTypeCheckArgs {
    #[serde(default)]
    severity_level: Option<String>,
    #[serde(default)]
    ignore_patterns: Option<Vec<String>>,
    #[serde(default)]
    page: Option<i64>,
    #[serde(default)]
    page_size: Option<i64>,
}

/// Validated arguments for one type-check run
#[derive(Debug, Clone)]
pub struct TypeCheckRequest {
    pub severity: SeverityLevel,
    pub ignore_patterns: Vec<String>,
    pub page: i64,
    pub page_size: NonZeroUsize,
}

impl Default for TypeCheckRequest {
    fn default() -> Self {
        Self {
            severity: SeverityLevel::default(),
            ignore_patterns: Vec::new(),
            page: 1,
            page_size: default_page_size(),
        }
    }
}

impl TryFrom<RunTypeCheckArgs> for TypeCheckRequest {
    type Error = ToolError;

    fn try_from(args: RunTypeCheckArgs) -> Result<Self, Self::Error> {
        let severity = match args.severity_level.as_deref() {
            None => SeverityLevel::default(),
            Some(raw) => raw.parse().map_err(ToolError::InvalidParams)?,
        };

        let page_size = match args.page_size {
            None => default_page_size(),
            Some(n) => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .ok_or_else(|| {
                    ToolError::InvalidParams(format!("page_size must be at least 1, got {}", n))
                })?,
        };

        Ok(Self {
            severity,
            ignore_patterns: args.ignore_patterns.unwrap_or_default(),
            page: args.page.unwrap_or(1),
            page_size,
        })
    }
}

fn default_page_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN)
}

pub struct RunTypeCheckTool {
    root: PathBuf,
    runner: Arc<dyn AnalysisRunner>,
}

impl RunTypeCheckTool {
    pub fn new(root: impl Into<PathBuf>, runner: Arc<dyn AnalysisRunner>) -> Self {
        Self {
            root: root.into(),
            runner,
        }
    }

    /// Run the pipeline, reporting progress and any failure through `reporter`.
    pub async fn check(
        &self,
        request: TypeCheckRequest,
        reporter: &dyn ProgressReporter,
    ) -> Result<CheckResult, ToolError> {
        reporter.info(&format!(
            "Starting Pyright analysis on: {}",
            self.root.display()
        ));

        match self.run_pipeline(request, reporter).await {
            Ok(result) => Ok(result),
            Err(e) => {
                reporter.error(&format!("Type checking failed: {}", e));
                Err(e)
            }
        }
    }

    async fn run_pipeline(
        &self,
        request: TypeCheckRequest,
        reporter: &dyn ProgressReporter,
    ) -> Result<CheckResult, ToolError> {
        reporter.debug("Discovering Python files...");
        let files = discover(&self.root, request.ignore_patterns).await?;
        reporter.info(&format!("Found {} Python files to analyze", files.len()));

        reporter.report_progress(0.3, 1.0, "Running Pyright analysis...");
        let project = resolve_root(&self.root)?;
        let raw = self
            .runner
            .run(&project, request.severity)
            .await
            .map_err(CheckError::from)?;

        reporter.report_progress(0.8, 1.0, "Processing results...");
        let result = transform_pyright_output(&raw, request.page, request.page_size);

        reporter.info(&result.summary_line());
        reporter.report_progress(1.0, 1.0, "Complete");

        Ok(result)
    }
}

#[async_trait]
impl Tool for RunTypeCheckTool {
    fn name(&self) -> &str {
        "run_type_check"
    }

    fn description(&self) -> &str {
        "Run Pyright type checking on the project and return diagnostics with a summary. \
         Results are paginated; use page and page_size to walk through large result sets."
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "severity_level": {
                    "type": "string",
                    "enum": SeverityLevel::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
                    "default": SeverityLevel::default().as_str(),
                    "description": "Minimum severity level to report"
                },
                "ignore_patterns": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Additional gitignore-style patterns to exclude"
                },
                "page": {
                    "type": "integer",
                    "default": 1,
                    "description": "Page number (1-based); out-of-range values are clamped"
                },
                "page_size": {
                    "type": "integer",
                    "minimum": 1,
                    "default": DEFAULT_PAGE_SIZE,
                    "description": "Diagnostics per page"
                }
            }),
            vec![],
        )
    }

    async fn execute(
        &self,
        args: Value,
        reporter: &dyn ProgressReporter,
    ) -> Result<ToolResult, ToolError> {
        let args: RunTypeCheckArgs = parse_args(args)?;
        let request = TypeCheckRequest::try_from(args)?;
        let result = self.check(request, reporter).await?;
        ToolResult::json(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(args: Value) -> Result<TypeCheckRequest, ToolError> {
        TypeCheckRequest::try_from(parse_args::<RunTypeCheckArgs>(args)?)
    }

    #[test]
    fn test_defaults() {
        let req = request(Value::Null).unwrap();
        assert_eq!(req.severity, SeverityLevel::Warning);
        assert!(req.ignore_patterns.is_empty());
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size.get(), 50);
    }

    #[test]
    fn test_explicit_arguments() {
        let req = request(json!({
            "severity_level": "Error",
            "ignore_patterns": ["tests/"],
            "page": -3,
            "page_size": 10
        }))
        .unwrap();

        assert_eq!(req.severity, SeverityLevel::Error);
        assert_eq!(req.ignore_patterns, vec!["tests/"]);
        assert_eq!(req.page, -3);
        assert_eq!(req.page_size.get(), 10);
    }

    #[test]
    fn test_rejects_unknown_severity() {
        let err = request(json!({"severity_level": "fatal"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }

    #[test]
    fn test_rejects_page_size_below_one() {
        for size in [0, -5] {
            let err = request(json!({"page_size": size})).unwrap_err();
            assert!(matches!(err, ToolError::InvalidParams(_)));
        }
    }

    #[test]
    fn test_rejects_non_integer_page() {
        let err = request(json!({"page": "two"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }
}
