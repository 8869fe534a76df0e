//! Console summary printed after a scan.
//!
//! Shows totals plus a ranked preview of the top groups for each
//! granularity. Both the number of groups and the locations listed per
//! group are bounded by [`PreviewLimits`].

use std::fmt::Write as _;
use std::io::{self, Write};

use yansi::Paint;

use crate::duplicates::{DuplicateGroup, DuplicateIndex};

/// Characters of content shown per preview entry.
const PREVIEW_WIDTH: usize = 120;

/// Bounds for the console preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLimits {
    /// Groups shown per granularity
    pub top: usize,
    /// Locations shown per group before `... and N more`
    pub max_locations: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            top: 10,
            max_locations: 10,
        }
    }
}

/// Console summary renderer.
pub struct ConsoleSummary<'a> {
    index: &'a DuplicateIndex,
    block_size: usize,
    limits: PreviewLimits,
    color: bool,
}

impl<'a> ConsoleSummary<'a> {
    /// Create a summary for `index`. `block_size` is used for labels only.
    #[must_use]
    pub fn new(index: &'a DuplicateIndex, block_size: usize, limits: PreviewLimits) -> Self {
        Self {
            index,
            block_size,
            limits,
            color: false,
        }
    }

    /// Enable or disable ANSI styling of headings.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Render the summary as text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let totals = self.index.totals();
        let block_label = format!("{}-line block", self.block_size);

        let _ = writeln!(out, "\n{}", self.heading("Scan summary:"));
        let _ = writeln!(out, "- Files scanned: {}", totals.total_files);
        let _ = writeln!(out, "- Total lines: {}", totals.total_lines);
        let _ = writeln!(
            out,
            "- Duplicate {} groups: {}",
            block_label,
            self.index.blocks().len()
        );
        let _ = writeln!(out, "- Duplicate line groups: {}", self.index.lines().len());

        if !self.index.blocks().is_empty() {
            let title = format!("Top duplicate {block_label}s:");
            let _ = writeln!(out, "\n{}", self.heading(&title));
            for group in self.index.block_groups().iter().take(self.limits.top) {
                let first = group.content().split('\n').next().unwrap_or_default();
                let _ = writeln!(
                    out,
                    "Occurrences: {} | First lines: {}",
                    group.len(),
                    clip(first)
                );
                self.write_locations(&mut out, group);
            }
        }

        if !self.index.lines().is_empty() {
            let _ = writeln!(out, "\n{}", self.heading("Top duplicate lines:"));
            for group in self.index.line_groups().iter().take(self.limits.top) {
                let _ = writeln!(
                    out,
                    "Occurrences: {} | Line: {}",
                    group.len(),
                    clip(group.content())
                );
                self.write_locations(&mut out, group);
            }
        }

        out
    }

    fn write_locations(&self, out: &mut String, group: &DuplicateGroup<'_>) {
        for occurrence in group.occurrences().iter().take(self.limits.max_locations) {
            let _ = writeln!(out, "  - {occurrence}");
        }
        let hidden = group.len().saturating_sub(self.limits.max_locations);
        if hidden > 0 {
            let _ = writeln!(out, "  ... and {hidden} more");
        }
    }

    /// Print the summary to stdout.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if stdout is closed.
    pub fn print(&self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(self.render().as_bytes())?;
        stdout.flush()
    }
}

fn clip(text: &str) -> String {
    text.chars().take(PREVIEW_WIDTH).collect()
}
