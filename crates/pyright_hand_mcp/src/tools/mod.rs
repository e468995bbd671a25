//! MCP Tool Implementations
//!
//! - `run_type_check`: discover, run Pyright, transform, paginate
//! - `list_source_files`: discovery only
//!
//! Both tools work on the server's fixed analysis root.

mod list_files;
mod registry;
mod type_check;

pub use list_files::ListSourceFilesTool;
pub use registry::ToolRegistry;
pub use type_check::{RunTypeCheckTool, TypeCheckRequest};

use crate::types::ToolError;
use pyright_hand_core::find_python_files;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Deserialize tool arguments; a missing or null `arguments` means "all defaults".
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidParams(e.to_string()))
}

/// Run discovery off the async worker threads.
pub(crate) async fn discover(root: &Path, patterns: Vec<String>) -> Result<Vec<PathBuf>, ToolError> {
    let root = root.to_path_buf();
    let files = tokio::task::spawn_blocking(move || find_python_files(&root, &patterns))
        .await
        .map_err(|e| ToolError::Internal(format!("Discovery task failed: {}", e)))??;
    Ok(files)
}
