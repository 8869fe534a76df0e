//! Line and block indexing.
//!
//! # Overview
//!
//! Each candidate file is decoded leniently, split into lines, and
//! normalized (leading and trailing whitespace trimmed). Two indices are
//! built in a single pass over the normalized lines:
//!
//! - **Lines**: every line that is long enough and not a bare structural
//!   token such as `}` or `);`
//! - **Blocks**: every window of `block_size` consecutive lines with no
//!   blank line and enough total content
//!
//! Files are processed in chunks. Within a chunk, files are read and
//! indexed in parallel on the current rayon pool; the per-file results are
//! then merged on one thread in candidate order, so occurrence lists come
//! out in discovery order regardless of scheduling.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::groups::{DuplicateIndex, Occurrence, OccurrenceMap, ScanTotals};
use crate::progress::ProgressCallback;
use crate::scanner::ScanError;

/// Lines that are never indexed on their own, whatever their length.
pub const STRUCTURAL_TOKENS: &[&str] = &["{", "}", "];", ");", "],", ")", ";"];

/// Files read in parallel before their results are merged.
const INDEX_CHUNK_SIZE: usize = 256;

/// Thresholds for line and block indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Minimum normalized line length (in characters) for line indexing.
    pub min_line_length: usize,
    /// Lines per block window. Values below 2 disable block indexing.
    pub block_size: usize,
    /// Minimum summed length of a window's lines.
    pub min_block_total_length: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            min_line_length: 20,
            block_size: 3,
            min_block_total_length: 50,
        }
    }
}

impl IndexerConfig {
    /// Whether block indexing runs at all.
    #[must_use]
    pub fn blocks_enabled(&self) -> bool {
        self.block_size > 1
    }
}

/// Trim leading and trailing whitespace, keeping internal spacing.
#[must_use]
pub fn normalize_line(line: &str) -> &str {
    line.trim()
}

/// Whether a normalized line is excluded from line indexing.
#[must_use]
pub fn should_skip_line(normalized: &str, min_line_length: usize) -> bool {
    normalized.is_empty()
        || normalized.chars().count() < min_line_length
        || STRUCTURAL_TOKENS.contains(&normalized)
}

/// Split text into lines on `\n`, `\r\n`, or a lone `\r`.
///
/// Terminators are not included. A trailing terminator does not produce a
/// final empty line.
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Render a path relative to `root` with `/` separators.
///
/// Paths outside `root` are rendered as given.
#[must_use]
pub fn relative_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Index entries produced from one file, in line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIndex {
    path: String,
    line_count: usize,
    lines: Vec<(String, usize)>,
    blocks: Vec<(String, usize)>,
}

impl FileIndex {
    /// Relative path of the indexed file.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw lines read, including blank and skipped ones.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_count
    }
}

/// Index already-decoded text as if it were the file at `rel_path`.
#[must_use]
pub fn index_text(rel_path: &str, text: &str, config: &IndexerConfig) -> FileIndex {
    let normalized: Vec<&str> = split_lines(text).into_iter().map(normalize_line).collect();

    let lines = normalized
        .iter()
        .enumerate()
        .filter(|(_, line)| !should_skip_line(line, config.min_line_length))
        .map(|(i, line)| ((*line).to_string(), i + 1))
        .collect();

    let mut blocks = Vec::new();
    if config.blocks_enabled() && normalized.len() >= config.block_size {
        let lengths: Vec<usize> = normalized.iter().map(|l| l.chars().count()).collect();
        for (start, window) in normalized.windows(config.block_size).enumerate() {
            if window.iter().any(|line| line.is_empty()) {
                continue;
            }
            let total: usize = lengths[start..start + config.block_size].iter().sum();
            if total < config.min_block_total_length {
                continue;
            }
            blocks.push((window.join("\n"), start + 1));
        }
    }

    FileIndex {
        path: rel_path.to_string(),
        line_count: normalized.len(),
        lines,
        blocks,
    }
}

/// Read a file with lenient decoding and index it.
///
/// # Errors
///
/// Returns [`ScanError`] if the file cannot be read. Invalid UTF-8 is never
/// an error; offending bytes become U+FFFD.
pub fn index_file(path: &Path, root: &Path, config: &IndexerConfig) -> Result<FileIndex, ScanError> {
    let bytes = std::fs::read(path).map_err(|e| ScanError::from_io(path.to_path_buf(), e))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(index_text(&relative_path(path, root), &text, config))
}

/// Accumulates per-file results into the two occurrence maps.
///
/// Files must be added in discovery order; occurrence lists keep the order
/// in which entries arrive.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    lines: OccurrenceMap,
    blocks: OccurrenceMap,
    totals: ScanTotals,
}

impl IndexBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one file's entries.
    pub fn add_file(&mut self, file: FileIndex) {
        self.totals.total_files += 1;
        self.totals.total_lines += file.line_count;

        for (key, line) in file.lines {
            self.lines
                .entry(key)
                .or_default()
                .push(Occurrence::new(file.path.as_str(), line));
        }
        for (key, start) in file.blocks {
            self.blocks
                .entry(key)
                .or_default()
                .push(Occurrence::new(file.path.as_str(), start));
        }
    }

    /// Count a candidate that could not be read. It contributes no lines.
    pub fn add_unreadable(&mut self) {
        self.totals.total_files += 1;
    }

    /// Drop non-duplicate keys and freeze the result.
    #[must_use]
    pub fn finish(self) -> DuplicateIndex {
        DuplicateIndex::new(self.lines, self.blocks, self.totals)
    }
}

/// Builds a [`DuplicateIndex`] from a list of candidate files.
pub struct ContentIndexer {
    root: PathBuf,
    config: IndexerConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ContentIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentIndexer")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl ContentIndexer {
    /// Create an indexer. `root` is used to compute relative paths.
    #[must_use]
    pub fn new(root: &Path, config: IndexerConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Index every file in `files`, in order.
    ///
    /// Unreadable files are counted in `total_files` and otherwise ignored.
    /// If shutdown is requested the returned index is incomplete; callers
    /// check the flag before using it.
    #[must_use]
    pub fn index(&self, files: &[PathBuf]) -> DuplicateIndex {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("indexing", files.len());
        }
        log::debug!("Indexing {} files", files.len());

        let processed = AtomicUsize::new(0);
        let mut builder = IndexBuilder::new();

        for chunk in files.chunks(INDEX_CHUNK_SIZE) {
            if self.is_shutdown_requested() {
                log::debug!("Indexing: Shutdown requested, stopping");
                break;
            }

            let results: Vec<Result<FileIndex, ScanError>> = chunk
                .par_iter()
                .map(|path| {
                    let result = index_file(path, &self.root, &self.config);
                    let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(done, path.to_string_lossy().as_ref());
                    }
                    result
                })
                .collect();

            for result in results {
                match result {
                    Ok(file) => {
                        log::trace!("Indexed {} ({} lines)", file.path(), file.line_count());
                        builder.add_file(file);
                    }
                    Err(e) => {
                        log::warn!("Skipping file: {}", e);
                        builder.add_unreadable();
                    }
                }
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("indexing");
        }

        builder.finish()
    }
}
