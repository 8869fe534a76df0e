//! dupelines - duplicate line and block scanner
//!
//! Walks a source tree, indexes every normalized line and every window of
//! consecutive lines, and reports content that occurs at least twice.
//!
//! The pipeline runs in three stages:
//! - [`scanner`] discovers candidate text files
//! - [`duplicates`] indexes them into a [`duplicates::DuplicateIndex`]
//! - [`output`] renders the report file and the console summary

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use bytesize::ByteSize;

use crate::cli::Cli;
use crate::config::{ScanConfig, Settings};
use crate::duplicates::{DuplicateFinder, DuplicateIndex, FinderError, ScanSummary};
use crate::error::ExitCode;
use crate::output::{
    write_atomic, ConsoleSummary, JsonReport, ReportFormat, ReportHeader, TextReport,
};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::absolute_path;
use crate::signal::ShutdownHandler;

/// Console behavior for a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Print nothing to stdout
    pub quiet: bool,
    /// Style console headings
    pub color: bool,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Absolute path of the written report
    pub report_path: PathBuf,
    /// Duplicate groups and totals
    pub index: DuplicateIndex,
    /// Root and timings
    pub summary: ScanSummary,
}

/// Run the CLI: load configuration, scan, write the report.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the root cannot be
/// scanned, the report cannot be written, or the run is interrupted.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let started = Instant::now();

    let settings = Settings::load(cli.config.as_deref(), &cli.overrides())
        .context("Failed to load configuration")?;
    let config = ScanConfig::from_settings(settings).context("Failed to load configuration")?;
    log::debug!("Using {:?}", config);

    let options = RunOptions {
        quiet: cli.quiet,
        color: !cli.no_color && std::io::stdout().is_terminal(),
    };

    let shutdown = match signal::install_handler() {
        Ok(handler) => handler,
        Err(e) => {
            log::warn!("{e}; Ctrl+C will stop the process immediately");
            ShutdownHandler::new()
        }
    };

    let outcome = run_scan(&config, options, &shutdown)?;

    if !options.quiet {
        println!("\nWrote report to: {}", outcome.report_path.display());
        println!("Elapsed: {:.2}s", started.elapsed().as_secs_f64());
    }

    Ok(ExitCode::Success)
}

/// Scan `config.root()`, write the report to `config.out()` and print the
/// console summary.
///
/// The report is written atomically. If `shutdown` fires at any point
/// before the write, no report is written and the error chain contains
/// [`FinderError::Interrupted`].
///
/// # Errors
///
/// Returns an error if the root is missing or not a directory, the report
/// cannot be rendered or written, or the scan is interrupted.
pub fn run_scan(
    config: &ScanConfig,
    options: RunOptions,
    shutdown: &ShutdownHandler,
) -> anyhow::Result<RunOutcome> {
    log::debug!(
        "Skipping files over {} ({} bytes)",
        ByteSize::b(config.max_file_size()),
        config.max_file_size()
    );

    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(options.quiet));
    let finder = DuplicateFinder::new(
        config
            .finder_config()
            .with_shutdown_flag(shutdown.get_flag())
            .with_progress_callback(progress),
    );

    let (index, summary) = finder
        .find_duplicates(config.root())
        .with_context(|| format!("Scan of {} failed", config.root().display()))?;

    let header = ReportHeader::new(&summary.root, config.indexer(), config.max_file_size());
    let report = match config.format() {
        ReportFormat::Text => TextReport::new(&header, &index).render(),
        ReportFormat::Json => JsonReport::new(&header, &index).render()?,
    };

    if shutdown.is_shutdown_requested() {
        return Err(FinderError::Interrupted.into());
    }

    let report_path = absolute_path(config.out())
        .with_context(|| format!("Invalid report path {}", config.out().display()))?;
    write_atomic(&report_path, report.as_bytes())?;
    log::debug!(
        "Report written in {:.2}s after discovery and {:.2}s of indexing",
        summary.discovery_duration.as_secs_f64(),
        summary.index_duration.as_secs_f64()
    );

    if !options.quiet {
        ConsoleSummary::new(&index, config.indexer().block_size, config.preview())
            .with_color(options.color)
            .print()
            .context("Failed to print summary")?;
    }

    Ok(RunOutcome {
        report_path,
        index,
        summary,
    })
}
