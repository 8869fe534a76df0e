//! Output formatters for duplicate scan results.
//!
//! This module provides the report formats and the console preview:
//! - [`report`]: plain-text report, the default
//! - [`json`]: JSON report for automation and scripting
//! - [`console`]: bounded summary printed to stdout
//!
//! Reports are rendered fully in memory and handed to [`write_atomic`], so a
//! failed or interrupted run never leaves a partial file at the target path.
//!
//! # Example
//!
//! ```no_run
//! use dupelines::duplicates::{DuplicateFinder, IndexerConfig};
//! use dupelines::output::{write_atomic, ReportHeader, TextReport};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (index, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let header = ReportHeader::new(&summary.root, IndexerConfig::default(), 2 * 1024 * 1024);
//! let text = TextReport::new(&header, &index).render();
//! write_atomic(Path::new("duplicate_report.txt"), text.as_bytes()).unwrap();
//! ```

pub mod console;
pub mod json;
pub mod report;

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duplicates::IndexerConfig;

// Re-export main types
pub use console::{ConsoleSummary, PreviewLimits};
pub use json::JsonReport;
pub use report::TextReport;

/// Report file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable text report
    #[default]
    Text,
    /// JSON report for scripting
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Errors that can occur while producing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing the report file failed.
    #[error("Failed to write report to {path}: {source}")]
    Io {
        /// Report path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Run metadata printed at the top of every report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    /// Local time the report was generated, `YYYY-MM-DD HH:MM:SS`
    pub generated: String,
    /// Absolute scan root
    pub root: PathBuf,
    /// Thresholds the scan ran with
    pub indexer: IndexerConfig,
    /// Size limit the scan ran with
    pub max_file_size: u64,
}

impl ReportHeader {
    /// Create a header stamped with the current local time.
    #[must_use]
    pub fn new(root: &Path, indexer: IndexerConfig, max_file_size: u64) -> Self {
        Self {
            generated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            root: root.to_path_buf(),
            indexer,
            max_file_size,
        }
    }

    /// Replace the timestamp, for reproducible output.
    #[must_use]
    pub fn with_timestamp(mut self, generated: impl Into<String>) -> Self {
        self.generated = generated.into();
        self
    }

    /// Label used for block sections, e.g. `3-line blocks`.
    #[must_use]
    pub fn block_label(&self) -> String {
        format!("{}-line blocks", self.indexer.block_size)
    }
}

/// Write `contents` to `path` atomically.
///
/// The data goes to a temporary file in the same directory, is flushed and
/// synced, and is then renamed over `path`. On any error the temporary file
/// is removed and `path` is left untouched.
///
/// A new report gets the same mode a plain create would give it (`0o666`
/// less the umask on Unix). Replacing an existing report keeps its mode.
///
/// # Errors
///
/// Returns [`ReportError::Io`] naming `path` if any step fails.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    let io_err = |source: std::io::Error| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".dupelines-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // open(2) masks this with the umask
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut temp = builder.tempfile_in(dir).map_err(io_err)?;
    if let Ok(existing) = std::fs::metadata(path) {
        if existing.is_file() {
            temp.as_file()
                .set_permissions(existing.permissions())
                .map_err(io_err)?;
        }
    }
    temp.write_all(contents).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;

    log::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
