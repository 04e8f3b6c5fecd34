//! Offset ↔ line/column conversion over a precomputed line-start table.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A location in the source: 1-based line and column plus the 0-based offset it
/// was derived from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// Line-start table for one version of the source text.
///
/// Entry 0 is always offset 0; every other entry is the offset right after a
/// `\n`. The table is rebuilt from scratch whenever the text changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new("")
    }
}

impl LineIndex {
    /// Scans `text` once and records every line start.
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0];
        line_starts.extend(memchr::memchr_iter(b'\n', bytes).map(|idx| idx + 1));
        Self {
            line_starts,
            len: bytes.len(),
        }
    }

    /// Number of lines; never zero.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Length in bytes of the indexed text.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset where the 1-based `line` starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|idx| self.line_starts.get(idx))
            .copied()
    }

    /// Converts an offset into a position.
    ///
    /// Offsets past the end of the text still resolve on the last line.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        Position {
            line: line_idx + 1,
            column: offset - line_start + 1,
            offset,
        }
    }

    /// Converts a 1-based line/column into an offset.
    ///
    /// Returns `None` for a line outside `1..=line_count`. The column is not
    /// checked against the line length, so the result may point past the line's
    /// terminator; callers clamp if they need to.
    pub fn position_to_offset(&self, line: usize, column: usize) -> Option<usize> {
        let start = self.line_start(line)?;
        start.checked_add(column)?.checked_sub(1)
    }
}
