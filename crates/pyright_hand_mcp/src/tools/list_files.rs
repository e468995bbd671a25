//! `list_source_files`: Python sources under the analysis root.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::{discover, parse_args};
use crate::progress::ProgressReporter;
use crate::types::{Tool, ToolError, ToolInputSchema, ToolResult};

#[derive(Debug, Default, Deserialize)]
struct ListSourceFilesArgs {
    #[serde(default)]
    ignore_patterns: Option<Vec<String>>,
}

pub struct ListSourceFilesTool {
    root: PathBuf,
}

impl ListSourceFilesTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Sorted absolute paths, as strings
    pub async fn list(
        &self,
        ignore_patterns: Vec<String>,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<String>, ToolError> {
        reporter.info(&format!(
            "Searching for Python files in: {}",
            self.root.display()
        ));

        match discover(&self.root, ignore_patterns).await {
            Ok(files) => {
                reporter.info(&format!("Found {} Python files", files.len()));
                Ok(files
                    .iter()
                    .map(|f| f.to_string_lossy().into_owned())
                    .collect())
            }
            Err(e) => {
                reporter.error(&format!("Failed to list files: {}", e));
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Tool for ListSourceFilesTool {
    fn name(&self) -> &str {
        "list_source_files"
    }

    fn description(&self) -> &str {
        "List the Python source files (.py, .pyi) that a type check would analyze. \
         Common virtualenv, cache and build directories are skipped, along with \
         anything matched by the project's .gitignore."
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "ignore_patterns": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Additional gitignore-style patterns to exclude"
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
        let args: ListSourceFilesArgs = parse_args(args)?;
        let files = self
            .list(args.ignore_patterns.unwrap_or_default(), reporter)
            .await?;
        ToolResult::json(&files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingReporter;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_reports_and_returns_sorted_paths() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.py"), "").unwrap();
        fs::write(dir.path().join("a.py"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let tool = ListSourceFilesTool::new(dir.path());
        let reporter = RecordingReporter::new();
        let files = tool.list(vec![], &reporter).await.unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.py"));
        assert!(files[1].ends_with("b.py"));

        let infos = reporter.infos();
        assert!(infos[0].starts_with("Searching for Python files in: "));
        assert_eq!(infos[1], "Found 2 Python files");
    }

    #[tokio::test]
    async fn test_missing_root_logs_error() {
        let tool = ListSourceFilesTool::new("/nonexistent/pyright-hand-root");
        let reporter = RecordingReporter::new();

        let err = tool.execute(Value::Null, &reporter).await.unwrap_err();

        assert_eq!(err.kind(), "not_found");
        let errors = reporter.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Failed to list files: Directory not found"));
    }

    #[tokio::test]
    async fn test_bad_arguments_are_invalid_params() {
        let tool = ListSourceFilesTool::new("/tmp");
        let reporter = RecordingReporter::new();

        let err = tool
            .execute(json!({"ignore_patterns": "not-a-list"}), &reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::InvalidParams(_)));
        assert!(reporter.reports().is_empty());
    }
}
