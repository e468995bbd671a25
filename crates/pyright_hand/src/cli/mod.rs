//! CLI commands for Pyright-hand

pub mod check;
pub mod files;
pub mod mcp;

use crate::GlobalArgs;
use anyhow::{Context, Result};
use pyright_hand_mcp::McpServerConfig;
use std::time::Duration;

/// Build the server configuration from command-line flags and environment.
pub fn server_config(args: &GlobalArgs) -> McpServerConfig {
    McpServerConfig {
        analysis_root: args.root.clone(),
        pyright_path: args.pyright_path.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
        ..Default::default()
    }
}

/// Multi-threaded runtime for the async commands
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_server_config_from_flags() {
        let args = GlobalArgs {
            log_level: "info".to_string(),
            log_dir: None,
            root: PathBuf::from("/srv/project"),
            pyright_path: Some(PathBuf::from("/opt/pyright/bin/pyright")),
            timeout_secs: 42,
        };

        let config = server_config(&args);

        assert_eq!(config.analysis_root, PathBuf::from("/srv/project"));
        assert_eq!(
            config.pyright_path,
            Some(PathBuf::from("/opt/pyright/bin/pyright"))
        );
        assert_eq!(config.timeout, Duration::from_secs(42));
        assert_eq!(config.server_name, "pyright-hand");
    }
}
