//! JSON report formatter.
//!
//! Carries the same data as the text report, in the same order.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated": "2024-05-01 12:00:00",
//!   "root": "/abs/root",
//!   "config": {
//!     "min_line_length": 20,
//!     "block_size": 3,
//!     "min_block_total_length": 50,
//!     "max_file_size_bytes": 2097152
//!   },
//!   "totals": { "total_files": 12, "total_lines": 3400 },
//!   "summary": {
//!     "block_groups": 1,
//!     "block_occurrences": 2,
//!     "line_groups": 4,
//!     "line_occurrences": 9
//!   },
//!   "block_duplicates": [
//!     {
//!       "occurrences": 2,
//!       "content": "...",
//!       "locations": [{ "path": "src/a.py", "line": 10 }]
//!     }
//!   ],
//!   "line_duplicates": []
//! }
//! ```

use serde::Serialize;

use super::{ReportError, ReportHeader};
use crate::duplicates::{DuplicateGroup, DuplicateIndex, Occurrence, ScanTotals};

/// Scan settings echoed in the report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonConfig {
    /// Minimum normalized line length
    pub min_line_length: usize,
    /// Lines per block window
    pub block_size: usize,
    /// Minimum summed length of a block window
    pub min_block_total_length: usize,
    /// File size limit
    pub max_file_size_bytes: u64,
}

/// Group and occurrence counts.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of duplicate block groups
    pub block_groups: usize,
    /// Occurrences across all block groups
    pub block_occurrences: usize,
    /// Number of duplicate line groups
    pub line_groups: usize,
    /// Occurrences across all line groups
    pub line_occurrences: usize,
}

/// One duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup<'a> {
    /// Number of locations
    pub occurrences: usize,
    /// Duplicated content
    pub content: &'a str,
    /// Every location in stored order
    pub locations: &'a [Occurrence],
}

impl<'a> From<DuplicateGroup<'a>> for JsonGroup<'a> {
    fn from(group: DuplicateGroup<'a>) -> Self {
        Self {
            occurrences: group.len(),
            content: group.content(),
            locations: group.occurrences(),
        }
    }
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    /// Local generation time
    pub generated: &'a str,
    /// Absolute scan root
    pub root: String,
    /// Scan settings
    pub config: JsonConfig,
    /// Scan totals
    pub totals: ScanTotals,
    /// Group counts
    pub summary: JsonSummary,
    /// Block groups, ranked
    pub block_duplicates: Vec<JsonGroup<'a>>,
    /// Line groups, ranked
    pub line_duplicates: Vec<JsonGroup<'a>>,
}

impl<'a> JsonReport<'a> {
    /// Build the report from a header and a finished index.
    #[must_use]
    pub fn new(header: &'a ReportHeader, index: &'a DuplicateIndex) -> Self {
        Self {
            generated: &header.generated,
            root: header.root.to_string_lossy().into_owned(),
            config: JsonConfig {
                min_line_length: header.indexer.min_line_length,
                block_size: header.indexer.block_size,
                min_block_total_length: header.indexer.min_block_total_length,
                max_file_size_bytes: header.max_file_size,
            },
            totals: index.totals(),
            summary: JsonSummary {
                block_groups: index.blocks().len(),
                block_occurrences: index.block_occurrence_count(),
                line_groups: index.lines().len(),
                line_occurrences: index.line_occurrence_count(),
            },
            block_duplicates: index.block_groups().into_iter().map(JsonGroup::from).collect(),
            line_duplicates: index.line_groups().into_iter().map(JsonGroup::from).collect(),
        }
    }

    /// Render as pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialize`] if serialization fails.
    pub fn render(&self) -> Result<String, ReportError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
