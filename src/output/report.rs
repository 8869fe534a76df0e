//! Plain-text duplicate report.
//!
//! Layout:
//!
//! ```text
//! Duplicate scan report
//! Generated: 2024-05-01 12:00:00
//! Root: /abs/root
//! Config: min_line_length=20, block_size=3, min_block_total_length=50, max_file_size_bytes=2097152
//! Scanned files: 12, total lines: 3400
//!
//! Duplicate 3-line blocks: 1 groups
//! Total block occurrences: 2
//! Duplicate lines: 4 groups
//! Total line occurrences: 9
//!
//!
//! === Duplicate 3-line blocks (details) ===
//!
//! Occurrences: 2
//! Block:
//! ...
//! Locations:
//! - src/a.py:10
//! - src/b.py:42
//!
//! ---
//!
//! === Duplicate lines (details) ===
//! ...
//! ```
//!
//! Block groups come first, then line groups, each ranked by occurrence
//! count and then content.

use std::fmt::Write;

use super::ReportHeader;
use crate::duplicates::{DuplicateGroup, DuplicateIndex};

/// Text report renderer.
pub struct TextReport<'a> {
    header: &'a ReportHeader,
    index: &'a DuplicateIndex,
}

impl<'a> TextReport<'a> {
    /// Create a new text report.
    #[must_use]
    pub fn new(header: &'a ReportHeader, index: &'a DuplicateIndex) -> Self {
        Self { header, index }
    }

    /// Render the full report.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) -> std::fmt::Result {
        let header = self.header;
        let config = &header.indexer;
        let totals = self.index.totals();
        let block_label = header.block_label();

        writeln!(out, "Duplicate scan report")?;
        writeln!(out, "Generated: {}", header.generated)?;
        writeln!(out, "Root: {}", header.root.display())?;
        writeln!(
            out,
            "Config: min_line_length={}, block_size={}, min_block_total_length={}, max_file_size_bytes={}",
            config.min_line_length,
            config.block_size,
            config.min_block_total_length,
            header.max_file_size
        )?;
        writeln!(
            out,
            "Scanned files: {}, total lines: {}",
            totals.total_files, totals.total_lines
        )?;
        writeln!(out)?;

        writeln!(
            out,
            "Duplicate {}: {} groups",
            block_label,
            self.index.blocks().len()
        )?;
        writeln!(
            out,
            "Total block occurrences: {}",
            self.index.block_occurrence_count()
        )?;
        writeln!(out, "Duplicate lines: {} groups", self.index.lines().len())?;
        writeln!(
            out,
            "Total line occurrences: {}",
            self.index.line_occurrence_count()
        )?;
        writeln!(out, "\n")?;

        writeln!(out, "=== Duplicate {block_label} (details) ===\n")?;
        for group in self.index.block_groups() {
            write_group(out, "Block", &group)?;
        }

        writeln!(out, "=== Duplicate lines (details) ===\n")?;
        for group in self.index.line_groups() {
            write_group(out, "Line", &group)?;
        }

        Ok(())
    }
}

fn write_group(out: &mut String, kind: &str, group: &DuplicateGroup<'_>) -> std::fmt::Result {
    writeln!(out, "Occurrences: {}", group.len())?;
    writeln!(out, "{kind}:")?;
    writeln!(out, "{}", group.content())?;
    writeln!(out, "Locations:")?;
    for occurrence in group.occurrences() {
        writeln!(out, "- {occurrence}")?;
    }
    writeln!(out, "\n---\n")
}
