//! Progress and log reporting for tool calls.
//!
//! Tools talk to a [`ProgressReporter`]. The server hands them a
//! [`NotificationReporter`] that turns each call into an MCP notification;
//! tests and the CLI use [`RecordingReporter`] or [`TracingReporter`].

use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use crate::protocol::{methods, Outbox};

/// Logger name attached to every `notifications/message`
pub const LOGGER_NAME: &str = "pyright_hand";

/// Capability handed to a tool for user-visible progress and log messages
pub trait ProgressReporter: Send + Sync {
    fn info(&self, message: &str);

    fn debug(&self, message: &str);

    fn error(&self, message: &str);

    /// `progress` out of `total` (the tools use `total = 1.0`)
    fn report_progress(&self, progress: f64, total: f64, message: &str);
}

/// MCP log levels, in syslog order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl LogLevel {
    const ALL: [LogLevel; 8] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Notice,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
        LogLevel::Alert,
        LogLevel::Emergency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Notice => "notice",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
            LogLevel::Alert => "alert",
            LogLevel::Emergency => "emergency",
        }
    }

    fn from_u8(value: u8) -> Self {
        Self::ALL
            .get(value as usize)
            .copied()
            .unwrap_or(LogLevel::Debug)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown log level: {}", s))
    }
}

/// Minimum level for log notifications, shared between the server and the
/// reporters of in-flight calls.
#[derive(Debug, Clone)]
pub struct LogThreshold(Arc<AtomicU8>);

impl LogThreshold {
    pub fn new(level: LogLevel) -> Self {
        Self(Arc::new(AtomicU8::new(level as u8)))
    }

    pub fn get(&self) -> LogLevel {
        LogLevel::from_u8(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, level: LogLevel) {
        self.0.store(level as u8, Ordering::Relaxed);
    }

    pub fn allows(&self, level: LogLevel) -> bool {
        level >= self.get()
    }
}

impl Default for LogThreshold {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

// =============================================================================
// MCP notifications
// =============================================================================

/// Reporter bound to one `tools/call` request.
pub struct NotificationReporter {
    outbox: Outbox,
    progress_token: Option<Value>,
    threshold: LogThreshold,
}

impl NotificationReporter {
    pub fn new(outbox: Outbox, progress_token: Option<Value>, threshold: LogThreshold) -> Self {
        Self {
            outbox,
            progress_token,
            threshold,
        }
    }

    fn log(&self, level: LogLevel, message: &str) {
        if !self.threshold.allows(level) {
            return;
        }
        self.outbox.send_notification(
            methods::LOG_MESSAGE,
            json!({
                "level": level.as_str(),
                "logger": LOGGER_NAME,
                "data": message,
            }),
        );
    }
}

impl ProgressReporter for NotificationReporter {
    fn info(&self, message: &str) {
        info!("{}", message);
        self.log(LogLevel::Info, message);
    }

    fn debug(&self, message: &str) {
        debug!("{}", message);
        self.log(LogLevel::Debug, message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
        self.log(LogLevel::Error, message);
    }

    fn report_progress(&self, progress: f64, total: f64, message: &str) {
        debug!("Progress {:.0}%: {}", progress / total * 100.0, message);
        let Some(token) = &self.progress_token else {
            return;
        };
        self.outbox.send_notification(
            methods::PROGRESS,
            json!({
                "progressToken": token,
                "progress": progress,
                "total": total,
                "message": message,
            }),
        );
    }
}

// =============================================================================
// Local reporters
// =============================================================================

/// Reporter that only writes to `tracing`, for one-shot CLI runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn debug(&self, message: &str) {
        debug!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }

    fn report_progress(&self, progress: f64, total: f64, message: &str) {
        debug!("Progress {:.0}%: {}", progress / total * 100.0, message);
    }
}

/// One call captured by [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Info(String),
    Debug(String),
    Error(String),
    Progress {
        progress: f64,
        total: f64,
        message: String,
    },
}

/// Reporter that keeps every call in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<Report>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.lock().clone()
    }

    /// Messages of the `info` calls only
    pub fn infos(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|r| match r {
                Report::Info(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// Messages of the `error` calls only
    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|r| match r {
                Report::Error(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, report: Report) {
        self.lock().push(report);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Report>> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressReporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push(Report::Info(message.to_string()));
    }

    fn debug(&self, message: &str) {
        self.push(Report::Debug(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Report::Error(message.to_string()));
    }

    fn report_progress(&self, progress: f64, total: f64, message: &str) {
        self.push(Report::Progress {
            progress,
            total,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<String>) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    #[test]
    fn test_log_message_shape() {
        let (outbox, mut rx) = Outbox::channel();
        let reporter = NotificationReporter::new(outbox, None, LogThreshold::default());

        reporter.info("Found 3 Python files to analyze");

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["method"], "notifications/message");
        assert_eq!(frames[0]["params"]["level"], "info");
        assert_eq!(frames[0]["params"]["logger"], "pyright_hand");
        assert_eq!(frames[0]["params"]["data"], "Found 3 Python files to analyze");
        assert!(frames[0].get("id").is_none());
    }

    #[test]
    fn test_progress_requires_token() {
        let (outbox, mut rx) = Outbox::channel();
        let silent = NotificationReporter::new(outbox.clone(), None, LogThreshold::default());
        silent.report_progress(0.3, 1.0, "Running Pyright analysis...");
        assert!(drain(&mut rx).is_empty());

        let tracked =
            NotificationReporter::new(outbox, Some(json!("tok-1")), LogThreshold::default());
        tracked.report_progress(0.3, 1.0, "Running Pyright analysis...");

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["method"], "notifications/progress");
        assert_eq!(frames[0]["params"]["progressToken"], "tok-1");
        assert_eq!(frames[0]["params"]["progress"], 0.3);
        assert_eq!(frames[0]["params"]["total"], 1.0);
    }

    #[test]
    fn test_threshold_suppresses_lower_levels() {
        let (outbox, mut rx) = Outbox::channel();
        let threshold = LogThreshold::default();
        let reporter = NotificationReporter::new(outbox, None, threshold.clone());

        threshold.set(LogLevel::Warning);
        reporter.debug("hidden");
        reporter.info("hidden too");
        reporter.error("shown");

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["params"]["level"], "error");
    }

    #[test]
    fn test_log_level_parse_and_order() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Error < LogLevel::Emergency);
        assert_eq!(LogLevel::from_u8(200), LogLevel::Debug);
    }

    #[test]
    fn test_recording_reporter_keeps_order() {
        let reporter = RecordingReporter::new();
        reporter.info("a");
        reporter.report_progress(0.5, 1.0, "half");
        reporter.error("b");

        assert_eq!(
            reporter.reports(),
            vec![
                Report::Info("a".into()),
                Report::Progress {
                    progress: 0.5,
                    total: 1.0,
                    message: "half".into()
                },
                Report::Error("b".into()),
            ]
        );
        assert_eq!(reporter.infos(), vec!["a"]);
        assert_eq!(reporter.errors(), vec!["b"]);
    }
}
