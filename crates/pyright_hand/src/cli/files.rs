//! `pyright-hand files`: discovered Python files, one per line.

use anyhow::Result;
use pyright_hand_mcp::{ListSourceFilesTool, McpServerConfig, TracingReporter};

#[derive(Debug, Default)]
pub struct FilesArgs {
    pub ignore: Vec<String>,
}

pub fn run(config: McpServerConfig, args: FilesArgs) -> Result<()> {
    let runtime = super::runtime()?;
    let files = runtime.block_on(list(&config, args))?;

    for file in files {
        println!("{}", file);
    }
    Ok(())
}

async fn list(config: &McpServerConfig, args: FilesArgs) -> Result<Vec<String>> {
    let tool = ListSourceFilesTool::new(&config.analysis_root);
    Ok(tool.list(args.ignore, &TracingReporter).await?)
}
