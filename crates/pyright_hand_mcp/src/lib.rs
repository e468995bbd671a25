//! MCP (Model Context Protocol) server for Pyright type checking
//!
//! Exposes the Pyright pipeline from `pyright_hand_core` as two MCP tools so
//! that AI assistants can type-check a Python project and page through the
//! resulting diagnostics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    AI Assistant (client)                     │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ MCP Protocol (JSON-RPC over stdio)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 crates/pyright_hand_mcp/                     │
//! │                                                              │
//! │  Server     │ JSON-RPC stdio, dispatch, cancellation         │
//! │  Progress   │ notifications/message, notifications/progress  │
//! │  Tools      │ run_type_check, list_source_files              │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//!                    pyright_hand_core (discovery,
//!                    Pyright runner, transform, paging)
//! ```
//!
//! # Design Principles
//!
//! 1. **Fixed root:** both tools operate on the configured analysis root;
//!    callers never pass paths.
//!
//! 2. **Atomic calls:** a tool call either returns its whole result or a
//!    labeled error. Cancellation aborts the call and sends no response.
//!
//! 3. **Output budgets:** oversized results are replaced by a truncation
//!    notice that points the caller at `page_size`.

pub mod progress;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod types;

// Re-exports for convenience
pub use progress::{
    LogLevel, NotificationReporter, ProgressReporter, RecordingReporter, Report, TracingReporter,
};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use server::{McpServer, McpServerConfig};
pub use tools::{ListSourceFilesTool, RunTypeCheckTool, ToolRegistry, TypeCheckRequest};
pub use types::{Tool, ToolContent, ToolError, ToolResult};
