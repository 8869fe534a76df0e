//! Duplicate groups and the finished index.
//!
//! # Overview
//!
//! The indexer records every qualifying line and block window as an
//! [`Occurrence`] under its normalized content. Once all files are read,
//! keys seen fewer than twice are dropped and the rest become duplicate
//! groups, stored in a [`DuplicateIndex`] together with the [`ScanTotals`].
//!
//! Output stages read groups through [`DuplicateIndex::line_groups`] and
//! [`DuplicateIndex::block_groups`], which rank them by occurrence count
//! (descending) and then by content (ascending byte order).
//!
//! # Example
//!
//! ```
//! use dupelines::duplicates::{index_text, IndexBuilder, IndexerConfig};
//!
//! let config = IndexerConfig { block_size: 1, ..IndexerConfig::default() };
//! let mut builder = IndexBuilder::new();
//! builder.add_file(index_text("a.py", "import requests_client_wrapper_lib\n", &config));
//! builder.add_file(index_text("b.py", "import requests_client_wrapper_lib\n", &config));
//! let index = builder.finish();
//!
//! let groups = index.line_groups();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].occurrences().len(), 2);
//! ```

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// One location of a duplicated line or block.
///
/// `line` is the 1-based line number of the line, or of the first line of
/// a block window. `path` is relative to the scan root and uses `/`
/// separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Occurrence {
    path: String,
    line: usize,
}

impl Occurrence {
    pub(crate) fn new(path: impl Into<String>, line: usize) -> Self {
        debug_assert!(line >= 1, "line numbers are 1-based");
        Self {
            path: path.into(),
            line,
        }
    }

    /// Path relative to the scan root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 1-based line number.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

/// Map from normalized content to its occurrences in discovery order.
pub type OccurrenceMap = HashMap<String, Vec<Occurrence>>;

/// Counters accumulated over one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanTotals {
    /// Candidate files processed, including ones that failed to read
    pub total_files: usize,
    /// Raw lines read across all candidate files, before any filtering
    pub total_lines: usize,
}

/// A borrowed view of one duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateGroup<'a> {
    content: &'a str,
    occurrences: &'a [Occurrence],
}

impl<'a> DuplicateGroup<'a> {
    /// The duplicated content: a normalized line, or block lines joined by `\n`.
    #[must_use]
    pub fn content(&self) -> &'a str {
        self.content
    }

    /// Every location, in discovery order then line order.
    #[must_use]
    pub fn occurrences(&self) -> &'a [Occurrence] {
        self.occurrences
    }

    /// Number of occurrences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    /// Always false for groups taken from a [`DuplicateIndex`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

/// Sort groups by occurrence count descending, then content ascending.
#[must_use]
pub fn rank_groups(map: &OccurrenceMap) -> Vec<DuplicateGroup<'_>> {
    let mut groups: Vec<DuplicateGroup<'_>> = map
        .iter()
        .map(|(content, occurrences)| DuplicateGroup {
            content,
            occurrences,
        })
        .collect();
    groups.sort_unstable_by(|a, b| {
        (Reverse(a.len()), a.content).cmp(&(Reverse(b.len()), b.content))
    });
    groups
}

/// Drop every key with fewer than two occurrences.
pub fn retain_duplicates(map: &mut OccurrenceMap) {
    map.retain(|_, occurrences| occurrences.len() >= 2);
}

/// Filtered duplicate maps plus scan totals. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct DuplicateIndex {
    lines: OccurrenceMap,
    blocks: OccurrenceMap,
    totals: ScanTotals,
}

impl DuplicateIndex {
    /// Build an index, dropping non-duplicate keys from both maps.
    #[must_use]
    pub(crate) fn new(mut lines: OccurrenceMap, mut blocks: OccurrenceMap, totals: ScanTotals) -> Self {
        retain_duplicates(&mut lines);
        retain_duplicates(&mut blocks);
        Self {
            lines,
            blocks,
            totals,
        }
    }

    /// Scan totals.
    #[must_use]
    pub fn totals(&self) -> ScanTotals {
        self.totals
    }

    /// Raw line-duplicate map.
    #[must_use]
    pub fn lines(&self) -> &OccurrenceMap {
        &self.lines
    }

    /// Raw block-duplicate map.
    #[must_use]
    pub fn blocks(&self) -> &OccurrenceMap {
        &self.blocks
    }

    /// Line groups in report order.
    #[must_use]
    pub fn line_groups(&self) -> Vec<DuplicateGroup<'_>> {
        rank_groups(&self.lines)
    }

    /// Block groups in report order.
    #[must_use]
    pub fn block_groups(&self) -> Vec<DuplicateGroup<'_>> {
        rank_groups(&self.blocks)
    }

    /// Total occurrences across all line groups.
    #[must_use]
    pub fn line_occurrence_count(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }

    /// Total occurrences across all block groups.
    #[must_use]
    pub fn block_occurrence_count(&self) -> usize {
        self.blocks.values().map(Vec::len).sum()
    }

    /// True when neither granularity found anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.blocks.is_empty()
    }
}
