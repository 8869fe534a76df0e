//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Line and block indexing of candidate files
//! - Duplicate group ranking and totals
//! - Pipeline orchestration (discovery, then indexing)

pub mod finder;
pub mod groups;
pub mod indexer;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{
    rank_groups, retain_duplicates, DuplicateGroup, DuplicateIndex, Occurrence, OccurrenceMap,
    ScanTotals,
};
pub use indexer::{
    index_file, index_text, normalize_line, relative_path, should_skip_line, split_lines,
    ContentIndexer, FileIndex, IndexBuilder, IndexerConfig, STRUCTURAL_TOKENS,
};
