//! Scan configuration.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. Built-in defaults ([`Settings::default`])
//! 2. The user config file (`dupelines.toml` in the platform config directory)
//! 3. A file passed with `--config`
//! 4. Environment variables prefixed with `DUPELINES_`
//!    (e.g. `DUPELINES_MIN_LINE_LENGTH=30`)
//! 5. Command-line flags
//!
//! Exclude lists are additive: the built-in directory and file exclusions
//! always apply, configured names are added on top, and `--exclude-dir` /
//! `--exclude-file` flags are added on top of those.
//!
//! The merged [`Settings`] are validated and frozen into a [`ScanConfig`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duplicates::{FinderConfig, IndexerConfig};
use crate::output::{PreviewLimits, ReportFormat};
use crate::scanner::{WalkerConfig, DEFAULT_MAX_FILE_SIZE, DEFAULT_REPORT_NAME};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPELINES_";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has the wrong types.
    #[error("Invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Mergeable settings, as read from files and the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root directory to scan
    pub root: PathBuf,
    /// Report path
    pub out: PathBuf,
    /// Minimum normalized line length
    pub min_line_length: usize,
    /// Lines per block window
    pub block_size: usize,
    /// Minimum summed length of a block window
    pub min_block_total_length: usize,
    /// Extra directory names to prune
    pub exclude_dirs: Vec<String>,
    /// Extra file names to skip
    pub exclude_files: Vec<String>,
    /// Size limit in bytes
    pub max_file_size_bytes: u64,
    /// Report format
    pub format: ReportFormat,
    /// Groups shown per granularity in the console preview
    pub top: usize,
    /// Locations shown per group in the console preview
    pub max_locations: usize,
    /// Worker threads; unset uses all cores
    pub threads: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        let indexer = IndexerConfig::default();
        let preview = PreviewLimits::default();
        Self {
            root: PathBuf::from("."),
            out: PathBuf::from(DEFAULT_REPORT_NAME),
            min_line_length: indexer.min_line_length,
            block_size: indexer.block_size,
            min_block_total_length: indexer.min_block_total_length,
            exclude_dirs: Vec::new(),
            exclude_files: Vec::new(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            format: ReportFormat::default(),
            top: preview.top,
            max_locations: preview.max_locations,
            threads: None,
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_line_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_block_total_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ReportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_locations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    /// Appended to the configured list, never replacing it
    #[serde(skip)]
    pub exclude_dirs: Vec<String>,
    /// Appended to the configured list, never replacing it
    #[serde(skip)]
    pub exclude_files: Vec<String>,
}

impl Settings {
    /// Load settings from every layer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config_file` is given but missing, or if
    /// any layer fails to parse.
    pub fn load(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut files = Vec::new();
        if let Some(path) = user_config_path().filter(|p| p.is_file()) {
            log::debug!("Using user config {}", path.display());
            files.push(path);
        }
        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            files.push(path.to_path_buf());
        }
        Self::from_figment(Self::figment(&files, ENV_PREFIX, overrides), overrides)
    }

    /// Build the layered figment without extracting it.
    #[must_use]
    pub fn figment(files: &[PathBuf], env_prefix: &str, overrides: &ConfigOverrides) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        for file in files {
            figment = figment.merge(Toml::file(file));
        }
        figment
            .merge(Env::prefixed(env_prefix))
            .merge(Serialized::defaults(overrides))
    }

    /// Extract settings and append the command-line exclusions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if extraction fails.
    pub fn from_figment(figment: Figment, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut settings: Self = figment.extract().map_err(Box::new)?;
        settings
            .exclude_dirs
            .extend(overrides.exclude_dirs.iter().cloned());
        settings
            .exclude_files
            .extend(overrides.exclude_files.iter().cloned());
        Ok(settings)
    }
}

/// Platform-specific location of the user config file.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "dupelines", "dupelines").map(|d| d.config_dir().join("dupelines.toml"))
}

/// Validated, immutable scan configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    root: PathBuf,
    out: PathBuf,
    indexer: IndexerConfig,
    walker: WalkerConfig,
    format: ReportFormat,
    preview: PreviewLimits,
    threads: Option<usize>,
}

impl ScanConfig {
    /// Validate settings and freeze them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `block_size` or `threads` is 0.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        if settings.block_size == 0 {
            return Err(ConfigError::Invalid("block_size must be at least 1".into()));
        }
        if settings.threads == Some(0) {
            return Err(ConfigError::Invalid("threads must be at least 1".into()));
        }

        Ok(Self {
            root: settings.root,
            out: settings.out,
            indexer: IndexerConfig {
                min_line_length: settings.min_line_length,
                block_size: settings.block_size,
                min_block_total_length: settings.min_block_total_length,
            },
            walker: WalkerConfig::new(
                settings.exclude_dirs,
                settings.exclude_files,
                settings.max_file_size_bytes,
            ),
            format: settings.format,
            preview: PreviewLimits {
                top: settings.top,
                max_locations: settings.max_locations,
            },
            threads: settings.threads,
        })
    }

    /// Root directory to scan.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Report path.
    #[must_use]
    pub fn out(&self) -> &Path {
        &self.out
    }

    /// Line and block thresholds.
    #[must_use]
    pub fn indexer(&self) -> IndexerConfig {
        self.indexer
    }

    /// Directory names pruned during discovery, defaults included.
    #[must_use]
    pub fn exclude_dirs(&self) -> &BTreeSet<String> {
        &self.walker.exclude_dirs
    }

    /// File names skipped during discovery, defaults included.
    #[must_use]
    pub fn exclude_files(&self) -> &BTreeSet<String> {
        &self.walker.exclude_files
    }

    /// Size limit in bytes.
    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.walker.max_file_size
    }

    /// Report format.
    #[must_use]
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Console preview bounds.
    #[must_use]
    pub fn preview(&self) -> PreviewLimits {
        self.preview
    }

    /// Finder configuration for this scan, without shutdown or progress hooks.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        let config = FinderConfig::default()
            .with_walker_config(self.walker.clone())
            .with_indexer_config(self.indexer);
        match self.threads {
            Some(threads) => config.with_threads(threads),
            None => config,
        }
    }
}
