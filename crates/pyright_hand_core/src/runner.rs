//! Pyright subprocess execution
//!
//! [`AnalysisRunner`] is the seam between the pipeline and the external
//! checker. [`PyrightRunner`] is the real implementation:
//!
//! 1. Resolve the executable: configured path → `pyright` on PATH → `npx pyright`
//! 2. Run `<exe> <project> --outputjson --level=<severity> [--project <config>]`
//! 3. Wait at most `timeout`; on expiry the child is killed (`kill_on_drop`)
//! 4. Judge by output, not exit status (pyright exits 1 when it finds problems)

use crate::error::ExternalToolError;
use crate::model::SeverityLevel;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Hard ceiling on a single pyright run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const PYRIGHT_CONFIG_FILE: &str = "pyrightconfig.json";
const OUTPUT_SNIPPET_CHARS: usize = 500;

/// Runs the external analysis and returns its raw JSON document.
#[async_trait]
pub trait AnalysisRunner: Send + Sync {
    async fn run(
        &self,
        project: &Path,
        severity: SeverityLevel,
    ) -> Result<Map<String, Value>, ExternalToolError>;
}

/// Runs the `pyright` CLI as a subprocess
#[derive(Debug, Clone)]
pub struct PyrightRunner {
    pyright_path: Option<PathBuf>,
    timeout: Duration,
}

impl PyrightRunner {
    pub fn new() -> Self {
        Self {
            pyright_path: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use this executable instead of searching PATH
    pub fn with_pyright_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pyright_path = Some(path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn resolve_command(&self) -> Result<Vec<OsString>, ExternalToolError> {
        resolve_command_with(self.pyright_path.as_deref(), |name| which::which(name).ok())
    }
}

impl Default for PyrightRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisRunner for PyrightRunner {
    async fn run(
        &self,
        project: &Path,
        severity: SeverityLevel,
    ) -> Result<Map<String, Value>, ExternalToolError> {
        let mut command = self.resolve_command()?;
        command.extend(pyright_args(project, severity));

        let program = command[0].to_string_lossy().into_owned();
        info!("Running: {}", display_command(&command));

        let child = Command::new(&command[0])
            .args(&command[1..])
            .current_dir(project)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExternalToolError::CommandNotFound {
                        command: program.clone(),
                    }
                } else {
                    ExternalToolError::Spawn {
                        command: program.clone(),
                        source: e,
                    }
                }
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ExternalToolError::Spawn {
                    command: program,
                    source: e,
                })
            }
            Err(_) => {
                warn!("Pyright exceeded {:?}; child killed", self.timeout);
                return Err(ExternalToolError::Timeout {
                    timeout: self.timeout,
                });
            }
        };

        debug!(
            "Pyright exited with {} ({} bytes stdout, {} bytes stderr)",
            output.status,
            output.stdout.len(),
            output.stderr.len()
        );

        parse_pyright_output(&output.stdout, &output.stderr)
    }
}

/// Executable resolution chain, with PATH lookup injected for testing.
fn resolve_command_with(
    explicit: Option<&Path>,
    lookup: impl Fn(&str) -> Option<PathBuf>,
) -> Result<Vec<OsString>, ExternalToolError> {
    if let Some(path) = explicit {
        return Ok(vec![path.as_os_str().to_owned()]);
    }

    if let Some(pyright) = lookup("pyright") {
        return Ok(vec![pyright.into_os_string()]);
    }

    if let Some(npx) = lookup("npx") {
        debug!("pyright not on PATH, falling back to npx");
        return Ok(vec![npx.into_os_string(), OsString::from("pyright")]);
    }

    Err(ExternalToolError::NotInstalled)
}

fn pyright_args(project: &Path, severity: SeverityLevel) -> Vec<OsString> {
    let mut args = vec![
        project.as_os_str().to_owned(),
        OsString::from("--outputjson"),
        OsString::from(format!("--level={}", severity)),
    ];

    let config_path = project.join(PYRIGHT_CONFIG_FILE);
    if config_path.exists() {
        args.push(OsString::from("--project"));
        args.push(config_path.into_os_string());
    }

    args
}

/// Turn captured stdout/stderr into the raw JSON document.
fn parse_pyright_output(
    stdout: &[u8],
    stderr: &[u8],
) -> Result<Map<String, Value>, ExternalToolError> {
    let stdout = String::from_utf8_lossy(stdout);

    if !stdout.trim().is_empty() {
        return match serde_json::from_str::<Value>(&stdout) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ExternalToolError::InvalidOutput {
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
                snippet: snippet(&stdout),
            }),
            Err(e) => Err(ExternalToolError::InvalidOutput {
                reason: e.to_string(),
                snippet: snippet(&stdout),
            }),
        };
    }

    let stderr = String::from_utf8_lossy(stderr);
    if !stderr.trim().is_empty() {
        return Err(ExternalToolError::Failed {
            stderr: stderr.trim().to_string(),
        });
    }

    debug!("Pyright produced no output; treating as empty project");
    Ok(empty_project_output())
}

fn empty_project_output() -> Map<String, Value> {
    let value = json!({
        "version": "unknown",
        "time": "0",
        "generalDiagnostics": [],
        "summary": {
            "filesAnalyzed": 0,
            "errorCount": 0,
            "warningCount": 0,
            "informationCount": 0,
            "timeInSec": 0
        }
    });

    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(OUTPUT_SNIPPET_CHARS).collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn display_command(command: &[OsString]) -> String {
    command
        .iter()
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
