//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a source tree
//! and collecting the text files worth indexing. Traversal is top-down and
//! sorted by file name, so the candidate list is reproducible across runs.
//!
//! # Features
//!
//! - Excluded directories are pruned before descent (`filter_entry`), so
//!   trees such as `node_modules` are never read
//! - Exact file-name exclusions (lockfiles, previous reports)
//! - Size limit and binary-extension denylist, checked from metadata alone
//! - Parallel binary-content sniffing on the current rayon pool
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupelines::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/project"), WalkerConfig::default());
//! let candidates = walker.discover();
//! println!("Found {} text files", candidates.len());
//! ```

use std::collections::BTreeSet;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

use super::binary::{has_binary_extension, sniff_binary};
use super::{ScanError, SkipReason, WalkerConfig};
use crate::progress::ProgressCallback;

/// Directory walker for candidate file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
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

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries
    /// as soon as possible.
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

    /// Walk the directory tree, yielding files that pass the name, size,
    /// and extension filters.
    ///
    /// Binary content is not checked here; see [`Walker::discover`].
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        let exclude_dirs = &self.config.exclude_dirs;

        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| entry.depth() == 0 || !is_excluded_dir(entry, exclude_dirs))
            .filter_map(move |entry_result| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    return None;
                }

                match entry_result {
                    Ok(entry) => {
                        if entry.file_type().is_dir() {
                            return None;
                        }
                        self.process_entry(entry.path())
                    }
                    Err(e) => {
                        let path = e
                            .path()
                            .map_or_else(|| self.root.clone(), Path::to_path_buf);
                        log::warn!("Walker error for {}: {}", path.display(), e);
                        Some(Err(ScanError::from_io(path, std::io::Error::from(e))))
                    }
                }
            })
    }

    /// Apply the name, stat, size, and extension filters to one file.
    fn process_entry(&self, path: &Path) -> Option<Result<PathBuf, ScanError>> {
        let excluded_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.config.exclude_files.contains(n));
        if excluded_name {
            log::trace!("Skipping {} ({})", path.display(), SkipReason::ExcludedName);
            return None;
        }

        // Follows symlinks; a link into a directory fails the is_file check
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Cannot stat {}: {}", path.display(), e);
                return Some(Err(ScanError::from_io(path.to_path_buf(), e)));
            }
        };

        if let Err(reason) = self.check_metadata(path, &metadata) {
            log::trace!("Skipping {} ({})", path.display(), reason);
            return None;
        }

        Some(Ok(path.to_path_buf()))
    }

    fn check_metadata(&self, path: &Path, metadata: &Metadata) -> Result<(), SkipReason> {
        if !metadata.is_file() {
            return Err(SkipReason::NotAFile);
        }
        let size = metadata.len();
        if size > self.config.max_file_size {
            return Err(SkipReason::TooLarge(size));
        }
        if has_binary_extension(path) {
            return Err(SkipReason::BinaryExtension);
        }
        Ok(())
    }

    /// Discover every candidate text file under the root.
    ///
    /// Runs [`Walker::walk`] and then sniffs each surviving file's leading
    /// bytes on the current rayon pool. Walk order is preserved. Files that
    /// cannot be stat'ed or read are logged and left out.
    #[must_use]
    pub fn discover(&self) -> Vec<PathBuf> {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let listed: Vec<PathBuf> = self
            .walk()
            .enumerate()
            .filter_map(|(idx, result)| {
                if let Some(ref callback) = self.progress_callback {
                    callback.on_progress(idx + 1, "");
                }
                match result {
                    Ok(path) => Some(path),
                    Err(e) => {
                        log::debug!("Skipping unreadable entry: {}", e);
                        None
                    }
                }
            })
            .collect();

        log::debug!("Walk listed {} files, sniffing content", listed.len());

        let sniffed = AtomicUsize::new(0);
        let candidates: Vec<PathBuf> = listed
            .into_par_iter()
            .filter_map(|path| {
                if self.is_shutdown_requested() {
                    return None;
                }
                let done = sniffed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(ref callback) = self.progress_callback {
                    callback.on_progress(done, path.to_string_lossy().as_ref());
                }
                match sniff_binary(&path) {
                    Ok(false) => Some(path),
                    Ok(true) => {
                        log::trace!("Skipping {} ({})", path.display(), SkipReason::BinaryContent);
                        None
                    }
                    Err(e) => {
                        log::debug!("Cannot read {}: {}", path.display(), e);
                        None
                    }
                }
            })
            .collect();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("walking");
        }

        candidates
    }
}

fn is_excluded_dir(entry: &DirEntry, exclude_dirs: &BTreeSet<String>) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclude_dirs.contains(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    /// Create a test directory with some files.
    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        let mut f = File::create(dir.path().join("main.py")).unwrap();
        writeln!(f, "print('hello world')").unwrap();

        let mut f = File::create(dir.path().join("util.ts")).unwrap();
        writeln!(f, "export const answer = 42;").unwrap();

        let subdir = dir.path().join("pkg");
        fs::create_dir(&subdir).unwrap();
        let mut f = File::create(subdir.join("nested.rs")).unwrap();
        writeln!(f, "fn nested() {{}}").unwrap();

        dir
    }

    fn discover_sorted(root: &Path, config: WalkerConfig) -> Vec<PathBuf> {
        let mut files = Walker::new(root, config).discover();
        files.sort();
        files
    }

    #[test]
    fn test_walker_finds_files() {
        let dir = create_test_dir();
        let files = discover_sorted(dir.path(), WalkerConfig::default());

        assert_eq!(files.len(), 3);
        for file in &files {
            assert!(file.is_file());
            assert!(file.starts_with(dir.path()));
        }
    }

    #[test]
    fn test_walker_order_is_sorted_by_name() {
        let dir = create_test_dir();
        let files = Walker::new(dir.path(), WalkerConfig::default()).discover();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("main.py"),
                PathBuf::from("pkg").join("nested.rs"),
                PathBuf::from("util.ts"),
            ]
        );
    }

    #[test]
    fn test_walker_prunes_default_excluded_dirs() {
        let dir = create_test_dir();
        let nm = dir.path().join("node_modules").join("left-pad");
        fs::create_dir_all(&nm).unwrap();
        fs::write(nm.join("index.js"), "module.exports = leftPad;\n").unwrap();
        let git = dir.path().join(".git");
        fs::create_dir_all(&git).unwrap();
        fs::write(git.join("HEAD"), "ref: refs/heads/main\n").unwrap();

        let files = discover_sorted(dir.path(), WalkerConfig::default());

        assert_eq!(files.len(), 3);
        assert!(files
            .iter()
            .all(|p| !p.components().any(|c| c.as_os_str() == "node_modules")));
    }

    #[test]
    fn test_walker_prunes_user_excluded_dir_at_any_depth() {
        let dir = create_test_dir();
        let generated = dir.path().join("pkg").join("generated");
        fs::create_dir_all(&generated).unwrap();
        fs::write(generated.join("schema.rs"), "pub struct Schema;\n").unwrap();

        let config = WalkerConfig::new(vec!["generated".to_string()], vec![], 1024 * 1024);
        let files = discover_sorted(dir.path(), config);

        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_walker_excluded_name_only_matches_directories() {
        let dir = TempDir::new().unwrap();
        // A file named like an excluded directory is still scanned
        fs::write(dir.path().join("build"), "#!/bin/sh\necho building\n").unwrap();

        let files = discover_sorted(dir.path(), WalkerConfig::default());
        assert_eq!(files, vec![dir.path().join("build")]);
    }

    #[test]
    fn test_walker_skips_excluded_files() {
        let dir = create_test_dir();
        fs::write(dir.path().join("Cargo.lock"), "[[package]]\nname = \"x\"\n").unwrap();
        fs::write(dir.path().join("duplicate_report.txt"), "old report\n").unwrap();
        fs::write(dir.path().join("notes.md"), "# notes\n").unwrap();

        let config = WalkerConfig::new(vec![], vec!["notes.md".to_string()], 1024 * 1024);
        let files = discover_sorted(dir.path(), config);

        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_walker_max_size_filter() {
        let dir = create_test_dir();
        let large = dir.path().join("large.txt");
        let mut f = File::create(&large).unwrap();
        for _ in 0..100 {
            writeln!(f, "This is a line of text to make the file larger.").unwrap();
        }

        let config = WalkerConfig::new(vec![], vec![], 1000);
        let files = discover_sorted(dir.path(), config);

        assert!(!files.contains(&large));
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_walker_size_limit_is_inclusive() {
        let dir = TempDir::new().unwrap();
        let exact = dir.path().join("exact.txt");
        fs::write(&exact, vec![b'a'; 64]).unwrap();

        let config = WalkerConfig::new(vec![], vec![], 64);
        assert_eq!(discover_sorted(dir.path(), config), vec![exact]);
    }

    #[test]
    fn test_walker_skips_binary_extension_and_content() {
        let dir = create_test_dir();
        fs::write(dir.path().join("logo.PNG"), "not really a png").unwrap();
        fs::write(dir.path().join("blob.dat"), b"abc\0def").unwrap();
        fs::write(dir.path().join("empty.txt"), b"").unwrap();

        let files = discover_sorted(dir.path(), WalkerConfig::default());

        // empty.txt is text; logo.PNG and blob.dat are rejected
        assert_eq!(files.len(), 4);
        assert!(files.contains(&dir.path().join("empty.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn test_walker_symlinks() {
        let dir = create_test_dir();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("far.txt"), "far away text file\n").unwrap();

        std::os::unix::fs::symlink(outside.path(), dir.path().join("linked_dir")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("main.py"), dir.path().join("alias.py"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("dangling"))
            .unwrap();

        let files = discover_sorted(dir.path(), WalkerConfig::default());

        // The file link is scanned; the directory link and dangling link are not
        assert_eq!(files.len(), 4);
        assert!(files.contains(&dir.path().join("alias.py")));
    }

    #[test]
    fn test_walker_shutdown_flag() {
        let dir = create_test_dir();
        let flag = Arc::new(AtomicBool::new(true));
        let walker = Walker::new(dir.path(), WalkerConfig::default()).with_shutdown_flag(flag);

        assert!(walker.discover().is_empty());
    }
}
