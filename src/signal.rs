//! Ctrl+C handling.
//!
//! A single `AtomicBool` is shared between the signal hook and the scan.
//! Discovery and indexing check it between files; an interrupted scan
//! returns [`FinderError::Interrupted`](crate::duplicates::FinderError) and
//! no report is written. The process then exits with
//! [`EXIT_CODE_INTERRUPTED`].
//!
//! ```rust,no_run
//! use dupelines::duplicates::FinderConfig;
//! use dupelines::signal::install_handler;
//!
//! let handler = install_handler().unwrap();
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code after Ctrl+C (128 + SIGINT).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether Ctrl+C was pressed or [`request_shutdown`](Self::request_shutdown) was called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Set the flag.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clone of the flag for the walker and indexer.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error installing the signal hook.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// ctrlc refused the handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the Ctrl+C hook, or reuse the one already installed.
///
/// The hook can only be registered once per process. Later calls return
/// the registered handler with its flag cleared, so repeated runs in one
/// process (as in tests) each start uninterrupted.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if the hook cannot be registered
/// and no handler was registered earlier.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    let installed = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "\nInterrupted. Stopping scan...");
        let _ = stderr.flush();
    });

    match installed {
        Ok(()) => {
            let handler = GLOBAL_HANDLER.get_or_init(|| handler).clone();
            Ok(handler)
        }
        // Lost a race with another caller that registered first
        Err(err) => match GLOBAL_HANDLER.get() {
            Some(existing) => {
                existing.reset();
                Ok(existing.clone())
            }
            None => Err(err.into()),
        },
    }
}
