#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inclusive byte interval `[start, end]` covered by a node.
///
/// `start <= end` is expected; a zero-width range still covers its single offset.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Creates a range from its two inclusive bounds.
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width range at `offset`.
    #[inline]
    pub const fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Returns `true` if `offset` lies within the range, both ends included.
    #[inline]
    pub const fn covers(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Returns `true` if `other` lies entirely within this range.
    #[inline]
    pub const fn contains_range(&self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Number of bytes between the bounds.
    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` for a zero-width range.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Minimal tree contract required by the locator and the flattener.
///
/// A proper tree is expected (not a DAG):
/// - children are owned by exactly one parent;
/// - every child range is contained in its parent range;
/// - siblings appear in source order and do not overlap.
///
/// The last two are not enforced; lookups simply return the first match in
/// traversal order.
pub trait SyntaxNode {
    /// Kind tag, e.g. `"File"` or `"Ident"`.
    fn kind(&self) -> &str;
    /// Source range covered by the node.
    fn range(&self) -> TextRange;
    /// Direct children in source order.
    fn children(&self) -> &[Self]
    where
        Self: Sized;
}
