//! Logging setup for dupelines.
//!
//! Uses the `log` facade with an `env_logger` backend writing to stderr, so
//! stdout carries only the scan output. The level comes from, in order:
//!
//! 1. `RUST_LOG` (if set)
//! 2. `--quiet` (errors only) or `--verbose` (debug, then trace)
//! 3. Info
//!
//! Debug builds prefix each record with a timestamp, and with the module
//! path once `-v` is given. Release builds print level and message only.
//!
//! # Example
//!
//! ```rust,no_run
//! use dupelines::logging::init_logging;
//!
//! // -vv
//! init_logging(2, false);
//! log::trace!("indexing chunk");
//! ```

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize logging from the CLI verbosity flags.
///
/// Call once, before any logging.
///
/// # Panics
///
/// Panics if a logger is already installed.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var("RUST_LOG").ok();

    let mut builder = Builder::new();
    builder.target(Target::Stderr);

    match &from_env {
        Some(_) => {
            builder.parse_default_env();
        }
        None => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }

    configure_format(&mut builder, verbose);
    builder.init();

    match from_env {
        Some(spec) => log::debug!("Logging initialized from RUST_LOG={spec}"),
        None => log::debug!("Logging initialized at level: {}", current_level_name()),
    }
}

fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);

            if verbose >= 1 {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} [{}] {}",
                    timestamp,
                    level,
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} {}",
                    timestamp,
                    level,
                    record.args()
                )
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        });
    }
}

/// Name of the current maximum log level.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
