//! Command-line interface definitions for dupelines.
//!
//! Tunables are optional here so that unset flags fall through to the
//! config file and environment layers (see [`crate::config`]). The defaults
//! shown in `--help` are the built-in ones.
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory and write duplicate_report.txt
//! dupelines
//!
//! # Scan a project with stricter thresholds
//! dupelines --root ~/src/app --min-line-length 40 --block-size 5
//!
//! # Skip generated code and emit JSON
//! dupelines --exclude-dir generated --format json --out dupes.json
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::config::ConfigOverrides;
use crate::output::ReportFormat;

/// Find duplicated lines and multi-line blocks across a source tree.
///
/// Walks the tree, skips binary, oversized and excluded files, and writes
/// a ranked report of every normalized line and block window that occurs
/// at least twice.
#[derive(Debug, Parser)]
#[command(name = "dupelines")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory to scan [default: .]
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Report file path [default: duplicate_report.txt]
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Minimum normalized line length [default: 20]
    #[arg(long, value_name = "N")]
    pub min_line_length: Option<usize>,

    /// Lines per block window; 1 disables block detection [default: 3]
    #[arg(long, value_name = "N")]
    pub block_size: Option<usize>,

    /// Minimum summed length of a block window [default: 50]
    #[arg(long, value_name = "N")]
    pub min_block_total_length: Option<usize>,

    /// Directory name to skip, in addition to the defaults (repeatable)
    #[arg(long = "exclude-dir", value_name = "NAME")]
    pub exclude_dirs: Vec<String>,

    /// File name to skip, in addition to the defaults (repeatable)
    #[arg(long = "exclude-file", value_name = "NAME")]
    pub exclude_files: Vec<String>,

    /// Skip files larger than this (e.g. 2097152, 512KB, 2MiB) [default: 2MiB]
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_file_size_bytes: Option<u64>,

    /// Report format [default: text]
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Groups shown per section in the console summary [default: 10]
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Locations shown per group in the console summary [default: 10]
    #[arg(long, value_name = "N")]
    pub max_locations: Option<usize>,

    /// Worker threads [default: one per core]
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Values given on the command line, as the top config layer.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root: self.root.clone(),
            out: self.out.clone(),
            min_line_length: self.min_line_length,
            block_size: self.block_size,
            min_block_total_length: self.min_block_total_length,
            max_file_size_bytes: self.max_file_size_bytes,
            format: self.format,
            top: self.top,
            max_locations: self.max_locations,
            threads: self.threads,
            exclude_dirs: self.exclude_dirs.clone(),
            exclude_files: self.exclude_files.clone(),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports the following formats:
/// - Plain bytes: "1024", "1024B"
/// - Decimal units: "1KB", "1MB", "1GB" (powers of 1000)
/// - Binary units: "1KiB", "1MiB", "1GiB" (powers of 1024)
///
/// # Examples
///
/// ```
/// use dupelines::cli::parse_size;
///
/// assert_eq!(parse_size("2097152").unwrap(), 2_097_152);
/// assert_eq!(parse_size("512KB").unwrap(), 512_000);
/// assert_eq!(parse_size("2MiB").unwrap(), 2_097_152);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    // Whole numbers stay exact; fractions go through f64
    if let Ok(whole) = num_str.parse::<u64>() {
        return whole
            .checked_mul(multiplier)
            .ok_or_else(|| format!("Size too large: '{s}'"));
    }

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    Ok((num * multiplier as f64) as u64)
}
