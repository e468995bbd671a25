//! MCP Server CLI launcher
//!
//! The server communicates via stdio using JSON-RPC; logs go to stderr.

use anyhow::Result;
use pyright_hand_mcp::{McpServer, McpServerConfig};

/// Run the MCP server until stdin closes
pub fn run(config: McpServerConfig) -> Result<()> {
    let runtime = super::runtime()?;

    runtime.block_on(async move {
        let mut server = McpServer::new(config);

        tracing::info!(
            "MCP Server starting via stdio ({} tools registered, root {})",
            server.tools().len(),
            server.config().analysis_root.display()
        );

        server.run().await?;
        Ok::<(), anyhow::Error>(())
    })
}
