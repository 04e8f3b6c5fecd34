#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Behaviour knobs for [`ExplorerState`](crate::ExplorerState) and payload decoding.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// Value the parser uses for the first byte of the file (Go `token.Pos` starts at 1).
    pub position_base: usize,
    /// Levels expanded after a fresh parse when nothing was expanded before
    /// (0 = nothing, 1 = root only).
    pub initial_expand_depth: u16,
    /// Expand the ancestors of the node under the cursor so its row becomes visible.
    pub follow_cursor: bool,
}

impl ExplorerConfig {
    /// Defaults matching the Go parser: 1-based positions, root expanded, cursor followed.
    pub const fn new() -> Self {
        Self {
            position_base: 1,
            initial_expand_depth: 1,
            follow_cursor: true,
        }
    }

    /// Configuration for parsers that already report 0-based offsets.
    pub const fn zero_based() -> Self {
        Self::new().with_position_base(0)
    }

    #[must_use]
    pub const fn with_position_base(mut self, base: usize) -> Self {
        self.position_base = base;
        self
    }

    #[must_use]
    pub const fn with_initial_expand_depth(mut self, depth: u16) -> Self {
        self.initial_expand_depth = depth;
        self
    }

    #[must_use]
    pub const fn with_follow_cursor(mut self, follow: bool) -> Self {
        self.follow_cursor = follow;
        self
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self::new()
    }
}
