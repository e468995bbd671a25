//! Core types for MCP server
//!
//! Tool errors, tool results, and the Tool trait definition.

use async_trait::async_trait;
use pyright_hand_core::CheckError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::progress::ProgressReporter;

// =============================================================================
// Tool Error Types
// =============================================================================

/// Errors that can occur during tool execution
#[derive(Debug, Error)]
pub enum ToolError {
    /// Invalid parameters provided to the tool
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Unknown tool name
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Discovery or analysis failure
    #[error(transparent)]
    Check(#[from] CheckError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Get the JSON-RPC error code for this error type
    pub fn error_code(&self) -> i32 {
        match self {
            ToolError::InvalidParams(_) => -32602,
            ToolError::UnknownTool(_) => -32602,
            ToolError::Check(CheckError::NotFound { .. }) => -32001,
            ToolError::Check(_) => -32003,
            ToolError::Internal(_) => -32603,
            ToolError::Serialization(_) => -32700,
            ToolError::Io(_) => -32603,
        }
    }

    /// Short label shown in tool error text (`Error [<kind>]: ...`)
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::InvalidParams(_) => "invalid_params",
            ToolError::UnknownTool(_) => "unknown_tool",
            ToolError::Check(e) => e.kind(),
            ToolError::Internal(_) => "internal",
            ToolError::Serialization(_) => "serialization",
            ToolError::Io(_) => "io",
        }
    }

    /// Errors the caller caused by the shape of the request itself.
    ///
    /// These become JSON-RPC errors; everything else becomes an `isError` result.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, ToolError::InvalidParams(_) | ToolError::UnknownTool(_))
    }
}

// =============================================================================
// Tool Trait
// =============================================================================

/// JSON Schema for tool input parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInputSchema {
    /// Schema type (always "object" for MCP tools)
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Property definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,

    /// Required property names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl ToolInputSchema {
    /// Create a schema with properties
    pub fn with_properties(properties: Value, required: Vec<String>) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required)
            },
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
    }
}

/// Result of tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Content blocks returned by the tool
    pub content: Vec<ToolContent>,

    /// Whether this result indicates an error
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Create a successful JSON result (pretty-printed)
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ToolError> {
        let text = serde_json::to_string_pretty(value)?;
        Ok(Self::text(text))
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Total size of the text carried by this result
    pub fn text_len(&self) -> usize {
        self.content
            .iter()
            .map(|c| match c {
                ToolContent::Text { text } => text.len(),
            })
            .sum()
    }
}

/// Content types that can be returned by tools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content
    Text { text: String },
}

/// Trait for implementing MCP tools
///
/// Each tool must provide:
/// - A unique name
/// - A description for the assistant to understand when to use it
/// - An input schema defining expected parameters
/// - An async execute method that performs the tool's action
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name of the tool
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does
    fn description(&self) -> &str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> ToolInputSchema;

    /// Execute the tool with the given arguments
    ///
    /// Progress and log messages go through `reporter`; the tool never writes
    /// to the transport itself.
    async fn execute(
        &self,
        args: Value,
        reporter: &dyn ProgressReporter,
    ) -> Result<ToolResult, ToolError>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pyright_hand_core::ExternalToolError;
    use std::time::Duration;

    #[test]
    fn test_tool_error_codes() {
        assert_eq!(ToolError::InvalidParams("x".into()).error_code(), -32602);
        assert_eq!(ToolError::UnknownTool("x".into()).error_code(), -32602);
        assert_eq!(
            ToolError::Check(CheckError::not_found("/app/code")).error_code(),
            -32001
        );
        assert_eq!(ToolError::Internal("x".into()).error_code(), -32603);
    }

    #[test]
    fn test_check_error_code_distinct_from_not_initialized() {
        let not_initialized = crate::protocol::JsonRpcError::not_initialized().code;
        let timeout = ToolError::from(CheckError::from(ExternalToolError::Timeout {
            timeout: Duration::from_secs(1),
        }));
        assert_eq!(timeout.error_code(), -32003);
        assert_ne!(timeout.error_code(), not_initialized);
        assert_ne!(
            ToolError::Check(CheckError::not_found("/app/code")).error_code(),
            not_initialized
        );
    }

    #[test]
    fn test_tool_error_kind_follows_check_error() {
        let timeout = ToolError::from(CheckError::from(ExternalToolError::Timeout {
            timeout: Duration::from_secs(300),
        }));
        assert_eq!(timeout.kind(), "timeout");
        assert_eq!(
            timeout.to_string(),
            "Pyright execution timed out after 5 minutes"
        );

        let missing = ToolError::from(CheckError::not_found("/app/code"));
        assert_eq!(missing.kind(), "not_found");
        assert!(!missing.is_protocol_error());
        assert!(ToolError::InvalidParams("bad".into()).is_protocol_error());
    }

    #[test]
    fn test_tool_result_serialization() {
        let result = ToolResult::error("boom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isError"], true);
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "boom");

        let ok = serde_json::to_value(ToolResult::text("fine")).unwrap();
        assert_eq!(ok["isError"], false);
    }

    #[test]
    fn test_tool_result_json_is_pretty() {
        let result = ToolResult::json(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(result.text_len(), "{\n  \"a\": 1\n}".len());
    }

    #[test]
    fn test_input_schema_omits_empty_required() {
        let schema = ToolInputSchema::with_properties(serde_json::json!({}), vec![]);
        let json = schema.to_value();
        assert_eq!(json["type"], "object");
        assert!(json.get("required").is_none());
    }
}
