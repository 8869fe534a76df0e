//! Scan pipeline orchestration.
//!
//! # Overview
//!
//! [`DuplicateFinder`] runs the two stages that produce a
//! [`DuplicateIndex`]:
//!
//! 1. **Discovery**: walk the tree and collect candidate text files
//!    (see [`crate::scanner::Walker`])
//! 2. **Indexing**: read every candidate and build the line and block
//!    indices (see [`super::ContentIndexer`])
//!
//! Both stages use the same rayon pool, sized by [`FinderConfig::threads`].
//!
//! # Example
//!
//! ```no_run
//! use dupelines::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let (index, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!("{} files, {} duplicate lines", summary.candidate_files, index.lines().len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::groups::DuplicateIndex;
use super::indexer::{ContentIndexer, IndexerConfig};
use crate::progress::ProgressCallback;
use crate::scanner::{absolute_path, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Line and block thresholds.
    pub indexer_config: IndexerConfig,
    /// Worker threads; `None` uses rayon's global pool.
    pub threads: Option<usize>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("indexer_config", &self.indexer_config)
            .field("threads", &self.threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the indexer thresholds.
    #[must_use]
    pub fn with_indexer_config(mut self, config: IndexerConfig) -> Self {
        self.indexer_config = config;
        self
    }

    /// Use a dedicated pool with the given number of threads.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
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
}

/// Summary statistics from a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Absolute scan root
    pub root: PathBuf,
    /// Files accepted by discovery
    pub candidate_files: usize,
    /// Time spent discovering files
    pub discovery_duration: Duration,
    /// Time spent indexing files
    pub index_duration: Duration,
}

/// Errors that abort a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root could not be made absolute.
    #[error("I/O error for {path}: {source}")]
    IoWithPath {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Duplicate finder that runs discovery and indexing.
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Discover candidate files under `path`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if the path is missing, is not a directory, or
    /// the scan is interrupted.
    pub fn discover(&self, path: &Path) -> Result<Vec<PathBuf>, FinderError> {
        let root = resolve_root(path)?;
        let pool = self.build_pool();
        let files = run_in(pool.as_ref(), || self.walker(&root).discover());
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        Ok(files)
    }

    /// Find all duplicate lines and blocks under the given path.
    ///
    /// # Returns
    ///
    /// A tuple of:
    /// - [`DuplicateIndex`] - Filtered duplicate groups and totals
    /// - [`ScanSummary`] - Root and timing information
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist
    /// - The path is not a directory
    /// - The scan is interrupted by shutdown signal
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(DuplicateIndex, ScanSummary), FinderError> {
        let root = resolve_root(path)?;
        log::debug!("Starting duplicate scan of {}", root.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let pool = self.build_pool();
        let started = Instant::now();
        let files = run_in(pool.as_ref(), || self.walker(&root).discover());
        let discovery_duration = started.elapsed();
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        log::debug!(
            "Discovered {} candidate files in {:.2}s",
            files.len(),
            discovery_duration.as_secs_f64()
        );

        let started = Instant::now();
        let mut indexer = ContentIndexer::new(&root, self.config.indexer_config);
        if let Some(ref flag) = self.config.shutdown_flag {
            indexer = indexer.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            indexer = indexer.with_progress_callback(callback.clone());
        }
        let index = run_in(pool.as_ref(), || indexer.index(&files));
        let index_duration = started.elapsed();
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::debug!(
            "Indexed {} lines: {} duplicate line groups, {} duplicate block groups",
            index.totals().total_lines,
            index.lines().len(),
            index.blocks().len()
        );

        let summary = ScanSummary {
            root,
            candidate_files: files.len(),
            discovery_duration,
            index_duration,
        };
        Ok((index, summary))
    }

    fn walker(&self, root: &Path) -> Walker {
        let mut walker = Walker::new(root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }
        walker
    }

    /// Build the dedicated pool when a thread count is configured.
    ///
    /// `None` means work runs on rayon's global pool.
    fn build_pool(&self) -> Option<rayon::ThreadPool> {
        let threads = self.config.threads?;
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!(
                    "Failed to create thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                None
            }
        }
    }
}

/// Run `op` on `pool`, or on the global pool when there is none.
fn run_in<R, F>(pool: Option<&rayon::ThreadPool>, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Validate the scan root and make it absolute, folding `..` without resolving symlinks.
fn resolve_root(path: &Path) -> Result<PathBuf, FinderError> {
    if !path.exists() {
        return Err(FinderError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(FinderError::NotADirectory(path.to_path_buf()));
    }
    absolute_path(path).map_err(|source| FinderError::IoWithPath {
        path: path.to_path_buf(),
        source,
    })
}
