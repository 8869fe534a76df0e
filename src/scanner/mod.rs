//! Scanner module for directory traversal and candidate file discovery.
//!
//! This module provides functionality for:
//! - Sorted directory walking with excluded-directory pruning
//! - File name, size, and extension filtering
//! - Binary content detection
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and candidate discovery
//! - [`binary`]: Extension denylist and content sniffing
//!
//! # Example
//!
//! ```no_run
//! use dupelines::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for path in walker.discover() {
//!     println!("{}", path.display());
//! }
//! ```

pub mod binary;
pub mod walker;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

pub use binary::{has_binary_extension, is_binary_sample, sniff_binary};
pub use walker::Walker;

/// Directory names that are never descended into.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "dist",
    "build",
    "out",
    ".next",
    ".nuxt",
    ".cache",
    ".venv",
    "venv",
    "target",
    "bin",
    "obj",
    "coverage",
    "__pycache__",
    "ios",
    "android",
    "Pods",
    "vendor",
    ".gradle",
    ".idea",
    ".vscode",
];

/// Default report file name. Also excluded from scanning so a previous
/// report never shows up as a source of duplicates.
pub const DEFAULT_REPORT_NAME: &str = "duplicate_report.txt";

/// File names that are never scanned: lockfiles plus the default report.
pub const DEFAULT_EXCLUDE_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "go.sum",
    "Gemfile.lock",
    "poetry.lock",
    "composer.lock",
    "Podfile.lock",
    "npm-shrinkwrap.json",
    DEFAULT_REPORT_NAME,
];

/// Default upper bound on candidate file size (2 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Configuration for directory walking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Exact directory names pruned before descent.
    pub exclude_dirs: BTreeSet<String>,

    /// Exact file names that are skipped.
    pub exclude_files: BTreeSet<String>,

    /// Files larger than this many bytes are skipped.
    pub max_file_size: u64,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| (*s).to_string()).collect(),
            exclude_files: DEFAULT_EXCLUDE_FILES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl WalkerConfig {
    /// Create a configuration whose exclusion sets are the defaults plus
    /// the given extra names.
    #[must_use]
    pub fn new<D, F>(extra_dirs: D, extra_files: F, max_file_size: u64) -> Self
    where
        D: IntoIterator<Item = String>,
        F: IntoIterator<Item = String>,
    {
        let mut config = Self {
            max_file_size,
            ..Self::default()
        };
        config.exclude_dirs.extend(extra_dirs);
        config.exclude_files.extend(extra_files);
        config
    }
}

/// Why discovery rejected a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// File name is on the exclude list.
    ExcludedName,
    /// File exceeds the configured size limit.
    TooLarge(u64),
    /// Extension is on the binary denylist.
    BinaryExtension,
    /// Content sniff classified the file as binary.
    BinaryContent,
    /// Not a regular file (dangling link, socket, device).
    NotAFile,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExcludedName => write!(f, "excluded file name"),
            Self::TooLarge(size) => write!(f, "too large ({size} bytes)"),
            Self::BinaryExtension => write!(f, "binary extension"),
            Self::BinaryContent => write!(f, "binary content"),
            Self::NotAFile => write!(f, "not a regular file"),
        }
    }
}

/// Errors that can occur while examining a single file or directory.
///
/// All of these are recoverable: the walker logs them and moves on.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path disappeared between listing and stat.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}

/// Make `path` absolute and fold `.` and `..` components lexically.
///
/// Symlinks are not resolved, so `root/link/..` becomes `root`.
///
/// # Errors
///
/// Returns an error if the current directory is needed and cannot be read.
pub fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in std::path::absolute(path)?.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}
