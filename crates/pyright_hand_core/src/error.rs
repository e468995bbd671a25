//! Error types for discovery and Pyright invocation.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Core operation result type.
pub type Result<T> = std::result::Result<T, CheckError>;

/// Errors raised while scoping or running an analysis.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Analysis root does not exist (or is not a directory)
    #[error("Directory not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// An ignore pattern failed to compile
    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: ignore::Error,
    },

    /// Directory traversal failed
    #[error("Failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// IO error (reading .gitignore, resolving the root)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The external checker could not produce usable output
    #[error(transparent)]
    ExternalTool(#[from] ExternalToolError),
}

impl CheckError {
    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Short machine-readable label, used when errors cross the MCP boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::NotFound { .. } => "not_found",
            CheckError::InvalidPattern { .. } => "invalid_pattern",
            CheckError::Walk { .. } | CheckError::Io(_) => "io",
            CheckError::ExternalTool(ExternalToolError::Timeout { .. }) => "timeout",
            CheckError::ExternalTool(_) => "external_tool",
        }
    }
}

/// Failures of the Pyright subprocess.
///
/// None of these are retried; `Timeout` is kept distinct so callers never
/// confuse a hung checker with a clean project.
#[derive(Error, Debug)]
pub enum ExternalToolError {
    /// Neither pyright nor npx is available
    #[error(
        "Pyright not found. Please install it via 'npm install -g pyright' or 'pip install pyright'"
    )]
    NotInstalled,

    /// The resolved executable vanished before spawn
    #[error("Command not found: {command}")]
    CommandNotFound { command: String },

    /// Spawn failed for another reason
    #[error("Failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// No stdout, but pyright complained on stderr
    #[error("Pyright error: {stderr}")]
    Failed { stderr: String },

    /// stdout was not a JSON object
    #[error("Failed to parse Pyright output: {reason}\nOutput: {snippet}")]
    InvalidOutput { reason: String, snippet: String },

    /// The subprocess exceeded its time budget and was killed
    #[error("Pyright execution timed out after {}", format_timeout(*.timeout))]
    Timeout { timeout: Duration },
}

fn format_timeout(timeout: Duration) -> String {
    let secs = timeout.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        if minutes == 1 {
            "1 minute".to_string()
        } else {
            format!("{} minutes", minutes)
        }
    } else {
        format!("{:.1}s", timeout.as_secs_f64())
    }
}
