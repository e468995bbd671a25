//! Shared logging utilities for Pyright-hand binaries.
//!
//! stdout carries MCP frames, so console output always goes to stderr.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const WORKSPACE_CRATES: &[&str] = &[
    "pyright_hand",
    "pyright_hand_core",
    "pyright_hand_mcp",
    "pyright_hand_logging",
];

/// Logging configuration shared by Pyright-hand binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Level for workspace crates (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: &'a str,
    /// Write a daily rolling log file here in addition to stderr
    pub log_dir: Option<&'a Path>,
}

/// Keeps the non-blocking file writer alive; drop it last.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize tracing with stderr output and an optional rolling file writer.
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_logging(config: LogConfig<'_>) -> Result<LogGuard> {
    let (file_layer, guard) = match config.log_dir {
        Some(dir) => {
            let dir = ensure_dir(dir)?;
            let appender =
                tracing_appender::rolling::daily(&dir, format!("{}.log", sanitize_name(config.app_name)));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(build_filter(config.level)?);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_filter(build_filter(config.level)?),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LogGuard { _file: guard })
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default_directives(level))
        .with_context(|| format!("Invalid log level: {}", level))
}

fn default_directives(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(WORKSPACE_CRATES.iter().map(|krate| format!("{}={}", krate, level)));
    directives.join(",")
}

fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    Ok(dir.to_path_buf())
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        let directives = default_directives("DEBUG");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("pyright_hand_core=debug"));
        assert!(directives.contains("pyright_hand_mcp=debug"));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("pyright-hand"), "pyright-hand");
        assert_eq!(sanitize_name("pyright hand/mcp"), "pyright_hand_mcp");
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("a/b/logs");
        let created = ensure_dir(&nested).unwrap();
        assert!(created.is_dir());
    }
}
