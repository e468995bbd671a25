//! Tool Registry - Tool Discovery and Dispatch
//!
//! Maintains the list of available tools and dispatches calls by name.

use super::{ListSourceFilesTool, RunTypeCheckTool};
use crate::progress::ProgressReporter;
use crate::protocol::ToolDefinition;
use crate::types::{Tool, ToolError, ToolResult};
use pyright_hand_core::AnalysisRunner;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Registry of available MCP tools, keyed (and listed) by name
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Registry with both Pyright tools bound to `root`
    pub fn with_default_tools(root: &Path, runner: Arc<dyn AnalysisRunner>) -> Self {
        let mut registry = Self::new();

        registry.register(Box::new(RunTypeCheckTool::new(root, runner)));
        registry.register(Box::new(ListSourceFilesTool::new(root)));

        debug!("Registered {} tools", registry.tools.len());

        registry
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        debug!("Registering tool: {}", name);
        self.tools.insert(name, tool);
    }

    /// List all available tools, sorted by name
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema().to_value(),
            })
            .collect()
    }

    /// Call a tool by name
    pub async fn call_tool(
        &self,
        name: &str,
        args: Value,
        reporter: &dyn ProgressReporter,
    ) -> Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        tool.execute(args, reporter).await
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingReporter;
    use pyright_hand_core::PyrightRunner;

    fn registry() -> ToolRegistry {
        ToolRegistry::with_default_tools(Path::new("/app/code"), Arc::new(PyrightRunner::new()))
    }

    #[test]
    fn test_registry_has_both_tools() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.has_tool("run_type_check"));
        assert!(registry.has_tool("list_source_files"));
        assert!(!registry.has_tool("check_types"));
    }

    #[test]
    fn test_list_tools_sorted_by_name() {
        let names: Vec<String> = registry().list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["list_source_files", "run_type_check"]);
    }

    #[test]
    fn test_tool_definitions_have_object_schemas() {
        for def in registry().list_tools() {
            assert_eq!(def.input_schema["type"], "object", "{}", def.name);
            assert!(!def.description.is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let reporter = RecordingReporter::new();
        let err = registry()
            .call_tool("nope", Value::Null, &reporter)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "nope"));
        assert_eq!(err.error_code(), -32602);
    }
}
