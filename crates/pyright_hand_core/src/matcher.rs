//! Ignore matcher - which paths fall outside the analysis scope
//!
//! Patterns follow the gitignore dialect and are layered in a fixed order:
//!
//! 1. built-in defaults ([`DEFAULT_IGNORE_PATTERNS`])
//! 2. caller-supplied patterns
//! 3. non-comment lines of `<root>/.gitignore`, in file order
//!
//! Later patterns win, so a `!pattern` in `.gitignore` can re-include a path
//! excluded by a default or a caller pattern. Everything is compiled once into
//! an immutable [`IgnoreMatcher`]; queries never touch the filesystem.

use crate::error::{CheckError, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Directories and artifacts that are never worth type checking
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "__pycache__",
    "*.pyc",
    ".git",
    ".venv",
    "venv",
    "env",
    ".env",
    "node_modules",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "dist",
    "build",
    "*.egg-info",
];

const GITIGNORE_FILE: &str = ".gitignore";

/// Compiled ignore rules for one analysis root
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    gitignore: Gitignore,
    pattern_count: usize,
}

impl IgnoreMatcher {
    /// Build the matcher for `root`.
    ///
    /// Fails with [`CheckError::NotFound`] when `root` is not an existing
    /// directory.
    pub fn build(root: &Path, extra_patterns: &[String]) -> Result<Self> {
        if !root.is_dir() {
            return Err(CheckError::not_found(root));
        }

        let mut patterns: Vec<String> = DEFAULT_IGNORE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();
        patterns.extend(
            extra_patterns
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        );

        let gitignore_path = root.join(GITIGNORE_FILE);
        if gitignore_path.is_file() {
            let content = fs::read_to_string(&gitignore_path)?;
            let before = patterns.len();
            patterns.extend(gitignore_lines(&content));
            debug!(
                "Loaded {} patterns from {}",
                patterns.len() - before,
                gitignore_path.display()
            );
        }

        Self::from_patterns(root, &patterns)
    }

    /// Compile an explicit, ordered pattern list without reading any files.
    pub fn from_patterns(root: &Path, patterns: &[String]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .map_err(|source| CheckError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
        }

        let gitignore = builder.build().map_err(|source| CheckError::InvalidPattern {
            pattern: patterns.join(", "),
            source,
        })?;

        Ok(Self {
            gitignore,
            pattern_count: patterns.len(),
        })
    }

    /// Whether a file at `relative_path` (relative to the root) is excluded,
    /// either by its own path or because one of its parent directories is.
    pub fn is_ignored(&self, relative_path: &Path) -> bool {
        self.gitignore
            .matched_path_or_any_parents(relative_path, false)
            .is_ignore()
    }

    /// Whether the directory at `relative_path` should be pruned.
    pub fn is_dir_ignored(&self, relative_path: &Path) -> bool {
        self.gitignore.matched(relative_path, true).is_ignore()
    }

    /// Number of patterns compiled into this matcher
    pub fn len(&self) -> usize {
        self.pattern_count
    }

    pub fn is_empty(&self) -> bool {
        self.pattern_count == 0
    }
}

/// Trimmed, non-empty, non-comment lines of a `.gitignore` file.
fn gitignore_lines(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}
