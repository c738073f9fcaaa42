//! Image directory enumeration

use std::fs;
use std::path::{Path, PathBuf};

use detect_bench_core::{SourceError, WorkItem, WorkSource};

/// Extension matched when none are configured
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Source yielding the matching files directly inside one directory
///
/// Enumeration is non-recursive, skips hidden files, matches extensions
/// case-insensitively and returns items sorted by path so runs over the same
/// folder line up.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectorySource {
    /// Create a source over `root` matching `.jpg` files
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: vec![DEFAULT_EXTENSION.to_string()],
        }
    }

    /// Replace the set of matched extensions
    ///
    /// Leading dots are ignored, so `".png"` and `"png"` are equivalent. An
    /// empty set falls back to the default.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: Vec<String> = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        extensions.sort();
        extensions.dedup();

        if extensions.is_empty() {
            extensions.push(DEFAULT_EXTENSION.to_string());
        }
        self.extensions = extensions;
        self
    }

    /// Directory being enumerated
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extensions matched, lowercase and without dots
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Hidden files (leading dot) never match, whatever their extension
    fn matches(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('.'));
        !hidden
            && path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }

    fn unreadable(&self, source: std::io::Error) -> SourceError {
        SourceError::Unreadable {
            path: self.root.clone(),
            source,
        }
    }
}

impl WorkSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    fn enumerate(&self) -> Result<Vec<WorkItem>, SourceError> {
        let metadata = fs::metadata(&self.root).map_err(|e| self.unreadable(e))?;
        if !metadata.is_dir() {
            return Err(SourceError::NotADirectory(self.root.clone()));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|e| self.unreadable(e))? {
            let entry = entry.map_err(|e| self.unreadable(e))?;
            let path = entry.path();

            // Follows symlinks; dangling links are skipped.
            if path.is_file() && self.matches(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        tracing::debug!(
            root = %self.root.display(),
            extensions = ?self.extensions,
            matched = paths.len(),
            "Scanned image directory"
        );

        Ok(paths.into_iter().map(WorkItem::new).collect())
    }
}
