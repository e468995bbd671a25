//! Pyright-hand Core - Discovery, Invocation & Diagnostic Pagination
//!
//! Everything the MCP tools need that is not protocol plumbing lives here.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  Discovery  │     │   Runner    │     │  Transform   │     │  Paginate   │
//! │ (matcher +  │────▶│ (pyright    │────▶│ (raw JSON →  │────▶│ (slice +    │
//! │    walk)    │     │  --outputjson)    │  Diagnostic) │     │  metadata)  │
//! └─────────────┘     └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - **IgnoreMatcher**: built-in defaults + caller patterns + `.gitignore`, compiled once
//! - **AnalysisRunner**: seam around the external checker; tests swap in a stub
//! - **CheckResult**: the paginated, strongly typed result handed back to callers

pub mod discovery;
pub mod error;
pub mod matcher;
pub mod model;
pub mod paginate;
pub mod runner;
pub mod transform;

// Re-exports for convenience
pub use discovery::{find_python_files, resolve_root};
pub use error::{CheckError, ExternalToolError, Result};
pub use matcher::{IgnoreMatcher, DEFAULT_IGNORE_PATTERNS};
pub use model::{
    CheckResult, Diagnostic, DiagnosticPosition, DiagnosticRange, PaginationInfo, SeverityLevel,
    Summary,
};
pub use paginate::{paginate, DEFAULT_PAGE_SIZE};
pub use runner::{AnalysisRunner, PyrightRunner, DEFAULT_TIMEOUT};
pub use transform::transform_pyright_output;
