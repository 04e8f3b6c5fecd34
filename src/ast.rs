use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::RangeViolation;
use crate::id::NodeId;
use crate::model::{SyntaxNode, TextRange};

/// Kind-specific attribute attached to a node (identifier name, literal value, ...).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
#[derive(Clone, Debug, PartialEq)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Self>),
}

impl MetaValue {
    /// String payload, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

const LABEL_KEYS: [&str; 3] = ["name", "value", "path"];

/// A node of the parsed tree as delivered by the external parser.
///
/// Offsets are 0-based; the tree is immutable once built and replaced wholesale
/// on every reparse.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AstNode {
    pub kind: String,
    pub range: TextRange,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<Self>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub metadata: BTreeMap<String, MetaValue>,
    /// Name of the parent field holding this node, e.g. `"Body"` or `"Decls[1]"`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub field_name: Option<String>,
}

impl AstNode {
    pub fn new(kind: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind: kind.into(),
            range: TextRange::new(start, end),
            children: Vec::new(),
            metadata: BTreeMap::new(),
            field_name: None,
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    /// Text metadata under `key`, if present.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(MetaValue::as_str)
    }

    /// Row label: the kind followed by the node's name, value or import path.
    ///
    /// `Ident` with `name = "main"` reads `Ident main`; a node without any of
    /// those keys is labelled by its kind alone.
    pub fn label(&self) -> String {
        LABEL_KEYS
            .iter()
            .find_map(|key| self.metadata_str(key))
            .map_or_else(|| self.kind.clone(), |detail| format!("{} {detail}", self.kind))
    }

    /// Resolves a path id against this node taken as the root.
    pub fn node_at(&self, id: &NodeId) -> Option<&Self> {
        id.indices()
            .try_fold(self, |node, index| node.children.get(index))
    }

    /// Total number of nodes in the subtree, this one included.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Checks range containment and sibling ordering over the whole subtree.
    ///
    /// Adjacent siblings may share a boundary offset; anything that starts before
    /// the previous sibling ends is reported.
    pub fn check_ranges(&self) -> Result<(), RangeViolation> {
        let mut stack = vec![(self, NodeId::root())];
        while let Some((node, id)) = stack.pop() {
            if node.range.start > node.range.end {
                return Err(RangeViolation::Inverted {
                    id,
                    range: node.range,
                });
            }
            let mut previous: Option<TextRange> = None;
            for (index, child) in node.children.iter().enumerate() {
                let child_id = id.child(index);
                if !node.range.contains_range(child.range) {
                    return Err(RangeViolation::Escapes {
                        id: child_id,
                        parent: node.range,
                        child: child.range,
                    });
                }
                if let Some(prev) = previous
                    && child.range.start < prev.end
                {
                    return Err(RangeViolation::Unordered {
                        id: child_id,
                        previous: prev,
                        range: child.range,
                    });
                }
                previous = Some(child.range);
                stack.push((child, child_id));
            }
        }
        Ok(())
    }
}

impl SyntaxNode for AstNode {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn range(&self) -> TextRange {
        self.range
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}
