use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::NodeIdError;

const SEPARATOR: char = '-';

/// Pre-order path identifying a node within one flatten pass.
///
/// The root is `"0"`; every further segment is the 0-based ordinal of the child
/// under its parent (`"0-2-1"` is the second child of the third child of the root).
/// Ids are recomputed on every flatten, so they are only meaningful for the tree
/// they were derived from.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    /// Id of the tree root.
    pub fn root() -> Self {
        Self(String::from("0"))
    }

    /// Id of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        Self(format!("{}{SEPARATOR}{index}", self.0))
    }

    /// Id of the parent node, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rfind(SEPARATOR)
            .map(|idx| Self(self.0[..idx].to_owned()))
    }

    /// Returns `true` for the root id.
    pub fn is_root(&self) -> bool {
        !self.0.contains(SEPARATOR)
    }

    /// Nesting level: 0 for the root.
    pub fn depth(&self) -> usize {
        self.0.matches(SEPARATOR).count()
    }

    /// Child ordinals from the root downwards (the root segment is skipped).
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .split(SEPARATOR)
            .skip(1)
            .filter_map(|segment| segment.parse().ok())
    }

    /// Ordinal of this node under its parent, or `None` for the root.
    pub fn ordinal(&self) -> Option<usize> {
        let (_, last) = self.0.rsplit_once(SEPARATOR)?;
        last.parse().ok()
    }

    /// Returns `true` if `other` lies strictly below this node.
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(self.0.as_str())
            && other.0[self.0.len()..].starts_with(SEPARATOR)
    }

    /// Ancestors from the root down to the parent (the id itself excluded).
    pub fn ancestors(&self) -> Vec<Self> {
        let mut chain = Vec::with_capacity(self.depth());
        let mut current = self.parent();
        while let Some(id) = current {
            current = id.parent();
            chain.push(id);
        }
        chain.reverse();
        chain
    }

    /// String form of the path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for NodeId {
    type Err = NodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NodeIdError::Empty);
        }
        let mut segments = s.split(SEPARATOR);
        if segments.next() != Some("0") {
            return Err(NodeIdError::NotRooted(s.to_owned()));
        }
        for segment in segments {
            let valid = !segment.is_empty()
                && segment.bytes().all(|b| b.is_ascii_digit())
                && (segment == "0" || !segment.starts_with('0'));
            if !valid {
                return Err(NodeIdError::InvalidSegment {
                    id: s.to_owned(),
                    segment: segment.to_owned(),
                });
            }
        }
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<String> for NodeId {
    type Error = NodeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}
