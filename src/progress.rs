//! Progress reporting for the scan pipeline.
//!
//! This module provides the [`ProgressCallback`] trait and the [`Progress`]
//! reporter used by the CLI:
//!
//! - **walking**: an indicatif spinner on stderr while files are discovered
//! - **indexing**: the candidate count, then a plain `Scanned N files...`
//!   line on stdout every [`INDEX_REPORT_INTERVAL`] files, so output stays
//!   readable when piped

use std::io::{IsTerminal, Write};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Number of indexed files between two stdout progress lines.
pub const INDEX_REPORT_INTERVAL: usize = 200;

/// Progress callback for scan phases.
///
/// Implement this trait to receive progress updates during discovery and
/// indexing. Callbacks may be invoked from rayon worker threads.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (`"walking"` or `"indexing"`)
    /// * `total` - Total number of items to process, 0 when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of items processed so far (1-based)
    /// * `path` - Path being processed, may be empty
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Console progress reporter.
pub struct Progress {
    walking: Mutex<Option<ProgressBar>>,
    indexing: Mutex<bool>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupelines::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            walking: Mutex::new(None),
            indexing: Mutex::new(false),
            quiet,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} entries")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            "walking" => {
                let target = if std::io::stderr().is_terminal() {
                    ProgressDrawTarget::stderr()
                } else {
                    ProgressDrawTarget::hidden()
                };
                let pb = ProgressBar::with_draw_target(None, target);
                pb.set_style(Self::walking_style());
                pb.set_message("Discovering files");
                pb.enable_steady_tick(Duration::from_millis(100));
                if let Ok(mut walking) = self.walking.lock() {
                    *walking = Some(pb);
                }
            }
            "indexing" => {
                let mut stdout = std::io::stdout().lock();
                let _ = writeln!(stdout, "Discovered {total} candidate text files to scan.");
                if let Ok(mut indexing) = self.indexing.lock() {
                    *indexing = true;
                }
            }
            _ => {}
        }
    }

    fn on_progress(&self, current: usize, _path: &str) {
        if self.quiet {
            return;
        }

        if let Ok(walking) = self.walking.lock() {
            if let Some(ref pb) = *walking {
                pb.set_position(current as u64);
                return;
            }
        }

        let indexing = self.indexing.lock().map(|g| *g).unwrap_or(false);
        if indexing && current % INDEX_REPORT_INTERVAL == 0 {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "Scanned {current} files...");
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        match phase {
            "walking" => {
                if let Some(pb) = self.walking.lock().ok().and_then(|mut w| w.take()) {
                    pb.finish_and_clear();
                }
            }
            "indexing" => {
                if let Ok(mut indexing) = self.indexing.lock() {
                    *indexing = false;
                }
            }
            _ => {}
        }
    }
}
