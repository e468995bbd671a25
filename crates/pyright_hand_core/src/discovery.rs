//! Python source discovery
//!
//! Walks the analysis root top-down, pruning ignored directories before they
//! are entered, and returns every `.py` / `.pyi` file that survives the
//! [`IgnoreMatcher`], sorted by absolute path.

use crate::error::{CheckError, Result};
use crate::matcher::IgnoreMatcher;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const PYTHON_EXTENSIONS: &[&str] = &[".py", ".pyi"];

/// Find all Python files under `root`.
///
/// `extra_patterns` are layered after the built-in ignore set and before
/// `<root>/.gitignore`. Fails with [`CheckError::NotFound`] before any
/// traversal when `root` does not exist.
pub fn find_python_files(root: &Path, extra_patterns: &[String]) -> Result<Vec<PathBuf>> {
    let root = resolve_root(root)?;
    let matcher = IgnoreMatcher::build(&root, extra_patterns)?;

    let mut files = Vec::new();
    let mut dirs_skipped = 0usize;

    let walker = WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let keep = !matcher.is_dir_ignored(relative_to(&root, entry.path()));
            if !keep {
                dirs_skipped += 1;
            }
            keep
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(CheckError::Walk {
                    path: root.clone(),
                    source: e,
                });
            }
            Err(e) => {
                warn!("Skipping unreadable entry during discovery: {}", e);
                continue;
            }
        };

        // Directory links are never descended; file links count as files.
        let file_type = entry.file_type();
        if file_type.is_dir() || !is_python_file(entry.path()) {
            continue;
        }
        if file_type.is_symlink() && !entry.path().is_file() {
            continue;
        }

        if matcher.is_ignored(relative_to(&root, entry.path())) {
            continue;
        }

        files.push(entry.into_path());
    }

    files.sort();

    debug!(
        "Discovered {} Python files under {} ({} directories pruned)",
        files.len(),
        root.display(),
        dirs_skipped
    );

    Ok(files)
}

/// Canonicalize `root`, mapping a missing or non-directory path to `NotFound`.
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    let canonical = root.canonicalize().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CheckError::not_found(root),
        _ => CheckError::Io(e),
    })?;

    if !canonical.is_dir() {
        return Err(CheckError::not_found(root));
    }

    Ok(canonical)
}

fn relative_to<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

fn is_python_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .map_or(false, |name| {
            PYTHON_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_python_file() {
        assert!(is_python_file(Path::new("/a/main.py")));
        assert!(is_python_file(Path::new("/a/types.pyi")));
        assert!(!is_python_file(Path::new("/a/cache.pyc")));
        assert!(!is_python_file(Path::new("/a/notes.txt")));
        assert!(!is_python_file(Path::new("/a/py")));
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to(Path::new("/root"), Path::new("/root/src/a.py")),
            Path::new("src/a.py")
        );
        assert_eq!(
            relative_to(Path::new("/root"), Path::new("/elsewhere/a.py")),
            Path::new("/elsewhere/a.py")
        );
    }

    #[test]
    fn test_resolve_root_missing() {
        let result = resolve_root(Path::new("/nonexistent/pyright/root"));
        assert!(matches!(result, Err(CheckError::NotFound { .. })));
    }
}
