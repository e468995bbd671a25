//! MCP Server Implementation
//!
//! JSON-RPC 2.0 server over stdio for the Model Context Protocol.
//!
//! # Architecture
//!
//! Requests are read from stdin one line at a time. `initialize`, `ping`,
//! `tools/list` and `logging/setLevel` are answered inline; each `tools/call`
//! runs in its own task so that `notifications/cancelled` can abort it. All
//! outgoing frames (responses and the notifications emitted by running tools)
//! pass through a single writer.
//!
//! # Example
//!
//! ```ignore
//! let config = McpServerConfig::default();
//! let mut server = McpServer::new(config);
//! server.run().await?;
//! ```

use crate::progress::{LogLevel, LogThreshold, NotificationReporter};
use crate::protocol::{
    methods, write_frames, CancelledParams, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, Outbox, RequestId, ServerCapabilities, ServerInfo,
    SetLevelParams, ToolsCallParams, ToolsCapability, ToolsListResult, JSONRPC_VERSION,
    MCP_PROTOCOL_VERSION,
};
use crate::tools::ToolRegistry;
use crate::types::{ToolError, ToolResult};
use pyright_hand_core::{AnalysisRunner, PyrightRunner, DEFAULT_TIMEOUT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, BufReader};
use tokio::task::{AbortHandle, JoinError, JoinSet};
use tracing::{debug, error, info, trace, warn};

/// Default analysis root inside the container image
pub const DEFAULT_ANALYSIS_ROOT: &str = "/app/code";

/// Default output budget for a single tool result
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// MCP Server configuration
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Server name (reported in initialize)
    pub server_name: String,

    /// Server version (reported in initialize)
    pub server_version: String,

    /// Fixed project root both tools operate on
    pub analysis_root: PathBuf,

    /// Explicit Pyright executable; looked up on PATH when unset
    pub pyright_path: Option<PathBuf>,

    /// Upper bound on a single Pyright run
    pub timeout: Duration,

    /// Maximum size of a tool result's text in bytes
    pub max_response_bytes: usize,
}

impl McpServerConfig {
    /// Build the Pyright runner described by this configuration
    pub fn runner(&self) -> PyrightRunner {
        let runner = PyrightRunner::new().with_timeout(self.timeout);
        match &self.pyright_path {
            Some(path) => runner.with_pyright_path(path),
            None => runner,
        }
    }
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            server_name: "pyright-hand".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            analysis_root: PathBuf::from(DEFAULT_ANALYSIS_ROOT),
            pyright_path: None,
            timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

/// A running `tools/call` task. `seq` tells a reused request id apart.
struct InFlightCall {
    seq: u64,
    handle: AbortHandle,
}

type InFlight = Arc<Mutex<HashMap<RequestId, InFlightCall>>>;

/// Deregisters a call when its task ends, whether it returns, panics or is aborted.
struct InFlightGuard {
    in_flight: InFlight,
    id: RequestId,
    seq: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut in_flight = lock(&self.in_flight);
        if in_flight.get(&self.id).is_some_and(|call| call.seq == self.seq) {
            in_flight.remove(&self.id);
        }
    }
}

/// MCP Server
pub struct McpServer {
    config: McpServerConfig,
    tools: Arc<ToolRegistry>,
    log_threshold: LogThreshold,
    /// Running `tools/call` tasks by request id, for cancellation
    in_flight: InFlight,
    next_call: u64,
    initialized: bool,
}

impl McpServer {
    /// Create a server that runs the real Pyright CLI
    pub fn new(config: McpServerConfig) -> Self {
        let runner = Arc::new(config.runner());
        Self::with_runner(config, runner)
    }

    /// Create a server with a custom analysis runner
    pub fn with_runner(config: McpServerConfig, runner: Arc<dyn AnalysisRunner>) -> Self {
        let tools = ToolRegistry::with_default_tools(&config.analysis_root, runner);
        Self::with_registry(config, tools)
    }

    /// Create a server exposing exactly the tools in `tools`
    pub fn with_registry(config: McpServerConfig, tools: ToolRegistry) -> Self {
        Self {
            config,
            tools: Arc::new(tools),
            log_threshold: LogThreshold::default(),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_call: 0,
            initialized: false,
        }
    }

    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the server on stdin/stdout until stdin closes
    pub async fn run(&mut self) -> Result<(), ToolError> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC from `reader`, writing frames to `writer`.
    ///
    /// Returns once the input is exhausted and every in-flight call has finished.
    pub async fn serve<R, W>(&mut self, reader: R, writer: W) -> Result<(), ToolError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (outbox, rx) = Outbox::channel();
        let (read_result, write_result) =
            tokio::join!(self.read_loop(reader, outbox), write_frames(rx, writer));
        read_result?;
        write_result
    }

    async fn read_loop<R>(&mut self, reader: R, outbox: Outbox) -> Result<(), ToolError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut tasks = JoinSet::new();

        info!(
            "MCP server starting (root: {})",
            self.config.analysis_root.display()
        );

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) => self.handle_line(&line, &outbox, &mut tasks),
                        None => break,
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => log_join(joined),
            }
        }

        if !tasks.is_empty() {
            info!("Input closed; waiting for {} in-flight calls", tasks.len());
        }
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }

        info!("MCP server shutting down");
        Ok(())
    }

    fn handle_line(&mut self, line: &str, outbox: &Outbox, tasks: &mut JoinSet<()>) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        trace!("Received: {}", line);

        if let Some(response) = self.dispatch(line, outbox, tasks) {
            outbox.send_response(&response);
        }
    }

    /// Handle one frame. Returns the response to send now, if any.
    fn dispatch(
        &mut self,
        line: &str,
        outbox: &Outbox,
        tasks: &mut JoinSet<()>,
    ) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparseable frame: {}", e);
                return Some(JsonRpcResponse::error(
                    RequestId::Null,
                    JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
                ));
            }
        };

        let raw_id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok())
            .unwrap_or_default();

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    raw_id,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or_default(),
                JsonRpcError::invalid_request(format!(
                    "Invalid JSON-RPC version: {}",
                    request.jsonrpc
                )),
            ));
        }

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }
        let id = request.id.clone().unwrap_or_default();

        match request.method.as_str() {
            methods::INITIALIZE => Some(self.handle_initialize(id, request.params)),
            methods::PING => Some(JsonRpcResponse::success(
                id,
                Value::Object(Default::default()),
            )),
            methods::TOOLS_LIST => Some(self.handle_tools_list(id)),
            methods::TOOLS_CALL => self.handle_tools_call(id, request.params, outbox, tasks),
            methods::LOGGING_SET_LEVEL => Some(self.handle_set_level(id, request.params)),
            other => {
                debug!("Unknown method: {}", other);
                Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::method_not_found(other),
                ))
            }
        }
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            methods::INITIALIZED => debug!("Client initialized"),
            methods::CANCELLED => {
                match parse_params::<CancelledParams>(request.params.clone()) {
                    Ok(params) => self.cancel(&params),
                    Err(e) => warn!("Ignoring malformed cancellation: {}", e.message),
                }
            }
            other => debug!("Ignoring notification: {}", other),
        }
    }

    fn cancel(&self, params: &CancelledParams) {
        match lock(&self.in_flight).remove(&params.request_id) {
            Some(call) => {
                call.handle.abort();
                info!(
                    "Cancelled request {:?}{}",
                    params.request_id,
                    params
                        .reason
                        .as_deref()
                        .map(|r| format!(": {}", r))
                        .unwrap_or_default()
                );
            }
            None => debug!(
                "Cancellation for unknown or finished request {:?}",
                params.request_id
            ),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&mut self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = match parse_params(params) {
            Ok(params) => params,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        info!(
            "Initialize from {} v{} (protocol {})",
            params.client_info.name, params.client_info.version, params.protocol_version
        );

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
                logging: Some(Value::Object(Default::default())),
            },
            server_info: ServerInfo {
                name: self.config.server_name.clone(),
                version: self.config.server_version.clone(),
            },
        };

        to_response(id, &result)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.tools.list_tools(),
        };
        to_response(id, &result)
    }

    fn handle_set_level(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: SetLevelParams = match parse_params(params) {
            Ok(params) => params,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        match params.level.parse::<LogLevel>() {
            Ok(level) => {
                info!("Client log level set to {}", level);
                self.log_threshold.set(level);
                JsonRpcResponse::success(id, Value::Object(Default::default()))
            }
            Err(e) => JsonRpcResponse::error(id, JsonRpcError::invalid_params(e)),
        }
    }

    /// Handle tools/call request
    ///
    /// Validation failures are answered immediately; a valid call is spawned
    /// and answers through the outbox when it finishes.
    fn handle_tools_call(
        &mut self,
        id: RequestId,
        params: Option<Value>,
        outbox: &Outbox,
        tasks: &mut JoinSet<()>,
    ) -> Option<JsonRpcResponse> {
        if !self.initialized {
            return Some(JsonRpcResponse::error(id, JsonRpcError::not_initialized()));
        }

        let params: ToolsCallParams = match parse_params(params) {
            Ok(params) => params,
            Err(e) => return Some(JsonRpcResponse::error(id, e)),
        };

        if !self.tools.has_tool(&params.name) {
            let err = ToolError::UnknownTool(params.name);
            return Some(JsonRpcResponse::error(id, JsonRpcError::from_tool_error(&err)));
        }

        // Held across spawn so the task cannot deregister before it is registered.
        let mut in_flight = lock(&self.in_flight);
        if in_flight.contains_key(&id) {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Request id already in use by a running call"),
            ));
        }

        info!("Tool call: {} (id={:?})", params.name, id);

        let reporter = NotificationReporter::new(
            outbox.clone(),
            params.progress_token(),
            self.log_threshold.clone(),
        );
        let tools = Arc::clone(&self.tools);
        let outbox = outbox.clone();
        let max_bytes = self.config.max_response_bytes;
        let seq = self.next_call;
        self.next_call += 1;
        let guard = InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            id: id.clone(),
            seq,
        };

        let handle = tasks.spawn(async move {
            let result = tools
                .call_tool(&params.name, params.arguments, &reporter)
                .await;
            let response = tool_response(guard.id.clone(), &params.name, result, max_bytes);
            drop(guard);
            outbox.send_response(&response);
        });

        in_flight.insert(id, InFlightCall { seq, handle });
        None
    }
}

/// Map a finished tool call onto its JSON-RPC response.
fn tool_response(
    id: RequestId,
    name: &str,
    result: Result<ToolResult, ToolError>,
    max_bytes: usize,
) -> JsonRpcResponse {
    match result {
        Ok(result) => to_response(id, &enforce_budget(result, max_bytes)),
        Err(e) if e.is_protocol_error() => {
            JsonRpcResponse::error(id, JsonRpcError::from_tool_error(&e))
        }
        Err(e) => {
            error!("Tool {} failed: {}", name, e);
            to_response(
                id,
                &ToolResult::error(format!("Error [{}]: {}", e.kind(), e)),
            )
        }
    }
}

/// Replace an oversized result with a truncation notice.
fn enforce_budget(result: ToolResult, max_bytes: usize) -> ToolResult {
    let size = result.text_len();
    if size <= max_bytes {
        return result;
    }

    warn!("Response truncated from {} to {} bytes", size, max_bytes);
    let notice = serde_json::json!({
        "truncated": true,
        "max_bytes": max_bytes,
        "original_bytes": size,
        "message": "Response exceeded size limit. Use a smaller page_size to reduce output.",
    });
    ToolResult::error(
        serde_json::to_string_pretty(&notice)
            .unwrap_or_else(|_| r#"{"truncated": true}"#.to_string()),
    )
}

fn to_response<T: Serialize>(id: RequestId, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            JsonRpcResponse::error(
                id,
                JsonRpcError::internal_error("Failed to serialize response"),
            )
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
    let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn lock(in_flight: &InFlight) -> MutexGuard<'_, HashMap<RequestId, InFlightCall>> {
    in_flight
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn log_join(joined: Result<(), JoinError>) {
    match joined {
        Ok(()) => {}
        Err(e) if e.is_cancelled() => debug!("Tool call task cancelled"),
        Err(e) => error!("Tool call task panicked: {}", e),
    }
}
