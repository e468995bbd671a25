//! `pyright-hand check`: one type-check run, result JSON on stdout.

use anyhow::{Context, Result};
use pyright_hand_core::{CheckResult, SeverityLevel};
use pyright_hand_mcp::{McpServerConfig, RunTypeCheckTool, TracingReporter, TypeCheckRequest};
use std::num::NonZeroUsize;
use std::sync::Arc;

#[derive(Debug)]
pub struct CheckArgs {
    pub level: SeverityLevel,
    pub ignore: Vec<String>,
    pub page: i64,
    pub page_size: NonZeroUsize,
}

impl From<CheckArgs> for TypeCheckRequest {
    fn from(args: CheckArgs) -> Self {
        Self {
            severity: args.level,
            ignore_patterns: args.ignore,
            page: args.page,
            page_size: args.page_size,
        }
    }
}

pub fn run(config: McpServerConfig, args: CheckArgs) -> Result<()> {
    let runtime = super::runtime()?;
    let result = runtime.block_on(check(&config, args))?;

    let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}

async fn check(config: &McpServerConfig, args: CheckArgs) -> Result<CheckResult> {
    let tool = RunTypeCheckTool::new(&config.analysis_root, Arc::new(config.runner()));
    let result = tool.check(args.into(), &TracingReporter).await?;
    Ok(result)
}
