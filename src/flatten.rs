use std::fmt;

use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;

use crate::id::NodeId;
use crate::model::SyntaxNode;

/// Child ids of one entry; most syntax nodes have only a handful of children.
pub type ChildIds = SmallVec<[NodeId; 4]>;

/// One node of the tree in pre-order position, with navigation metadata.
pub struct FlatEntry<'a, N> {
    pub id: NodeId,
    pub node: &'a N,
    /// Nesting level: 0 for the root.
    pub level: u16,
    /// `None` only for the root.
    pub parent: Option<NodeId>,
    /// Direct children in source order, regardless of expansion state.
    pub child_ids: ChildIds,
}

impl<N> FlatEntry<'_, N> {
    #[inline]
    pub fn has_children(&self) -> bool {
        !self.child_ids.is_empty()
    }
}

impl<N> Clone for FlatEntry<'_, N> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            node: self.node,
            level: self.level,
            parent: self.parent.clone(),
            child_ids: self.child_ids.clone(),
        }
    }
}

impl<N> fmt::Debug for FlatEntry<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatEntry")
            .field("id", &self.id)
            .field("level", &self.level)
            .field("parent", &self.parent)
            .field("child_ids", &self.child_ids)
            .finish_non_exhaustive()
    }
}

/// Linearizes the tree in depth-first pre-order.
///
/// Parents always precede their descendants and siblings keep source order. The
/// root gets id `"0"`; every child appends `-<ordinal>` to its parent's id.
/// Flattening the same tree twice yields the same ids.
pub fn flatten<N: SyntaxNode>(root: Option<&N>) -> Vec<FlatEntry<'_, N>> {
    let Some(root) = root else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    let mut stack: Vec<(&N, NodeId, u16, Option<NodeId>)> = vec![(root, NodeId::root(), 0, None)];
    while let Some((node, id, level, parent)) = stack.pop() {
        let children = node.children();
        let child_ids: ChildIds = (0..children.len()).map(|idx| id.child(idx)).collect();
        // Reverse push keeps the first child on top of the stack.
        for (child, child_id) in children.iter().zip(child_ids.iter()).rev() {
            stack.push((
                child,
                child_id.clone(),
                level.saturating_add(1),
                Some(id.clone()),
            ));
        }
        entries.push(FlatEntry {
            id,
            node,
            level,
            parent,
            child_ids,
        });
    }
    entries
}

/// Flattened tree plus an id index, the lookup table used by the navigator.
pub struct FlatTree<'a, N> {
    entries: Vec<FlatEntry<'a, N>>,
    index: FxHashMap<NodeId, usize>,
}

impl<'a, N: SyntaxNode> FlatTree<'a, N> {
    /// Flattens `root` and indexes the result.
    pub fn new(root: Option<&'a N>) -> Self {
        Self::from_entries(flatten(root))
    }
}

impl<'a, N> FlatTree<'a, N> {
    /// Indexes already flattened entries.
    pub fn from_entries(entries: Vec<FlatEntry<'a, N>>) -> Self {
        let mut index = FxHashMap::with_capacity_and_hasher(entries.len(), FxBuildHasher);
        for (idx, entry) in entries.iter().enumerate() {
            index.insert(entry.id.clone(), idx);
        }
        Self { entries, index }
    }

    /// Entries in pre-order.
    pub fn entries(&self) -> &[FlatEntry<'a, N>] {
        &self.entries
    }

    pub fn get(&self, id: &NodeId) -> Option<&FlatEntry<'a, N>> {
        self.index.get(id).map(|&idx| &self.entries[idx])
    }

    /// Pre-order position of `id`.
    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn root(&self) -> Option<&FlatEntry<'a, N>> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlatEntry<'a, N>> {
        self.entries.iter()
    }
}

impl<'t, 'a, N> IntoIterator for &'t FlatTree<'a, N> {
    type Item = &'t FlatEntry<'a, N>;
    type IntoIter = std::slice::Iter<'t, FlatEntry<'a, N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstNode;

    fn tree() -> AstNode {
        AstNode::new("File", 0, 100).with_children(vec![
            AstNode::new("Package", 0, 10),
            AstNode::new("FuncDecl", 11, 50).with_children(vec![
                AstNode::new("Ident", 11, 15),
                AstNode::new("BlockStmt", 16, 50)
                    .with_children(vec![AstNode::new("ReturnStmt", 20, 30)]),
            ]),
            AstNode::new("FuncDecl", 51, 100),
        ])
    }

    fn ids<N>(entries: &[FlatEntry<'_, N>]) -> Vec<String> {
        entries.iter().map(|e| e.id.to_string()).collect()
    }

    #[test]
    fn flattens_in_pre_order() {
        let tree = tree();
        let flat = flatten(Some(&tree));
        assert_eq!(
            ids(&flat),
            vec!["0", "0-0", "0-1", "0-1-0", "0-1-1", "0-1-1-0", "0-2"]
        );
        let kinds: Vec<_> = flat.iter().map(|e| e.node.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["File", "Package", "FuncDecl", "Ident", "BlockStmt", "ReturnStmt", "FuncDecl"]
        );
        let levels: Vec<_> = flat.iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![0, 1, 1, 2, 2, 3, 1]);
    }

    #[test]
    fn records_parent_and_child_ids() {
        let tree = tree();
        let flat = flatten(Some(&tree));
        assert_eq!(flat[0].parent, None);
        assert_eq!(flat[1].parent.as_ref().map(NodeId::as_str), Some("0"));
        assert_eq!(flat[3].parent.as_ref().map(NodeId::as_str), Some("0-1"));

        let child_ids = |idx: usize| -> Vec<String> {
            flat[idx].child_ids.iter().map(ToString::to_string).collect()
        };
        assert_eq!(child_ids(0), vec!["0-0", "0-1", "0-2"]);
        assert!(child_ids(1).is_empty());
        assert_eq!(child_ids(2), vec!["0-1-0", "0-1-1"]);
        assert!(!flat[1].has_children());
    }

    #[test]
    fn flattening_is_deterministic() {
        let tree = tree();
        let first = flatten(Some(&tree));
        let second = flatten(Some(&tree));
        assert_eq!(ids(&first), ids(&second));
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.parent, b.parent);
            assert_eq!(a.child_ids, b.child_ids);
            assert!(std::ptr::eq(a.node, b.node));
        }
    }

    #[test]
    fn absent_tree_flattens_to_nothing() {
        assert!(flatten::<AstNode>(None).is_empty());
        assert!(FlatTree::<AstNode>::new(None).is_empty());
    }

    #[test]
    fn flat_tree_indexes_by_id() {
        let tree = tree();
        let flat = FlatTree::new(Some(&tree));
        assert_eq!(flat.len(), 7);
        let id: NodeId = "0-1-1".parse().unwrap();
        assert_eq!(flat.get(&id).map(|e| e.node.kind.as_str()), Some("BlockStmt"));
        assert_eq!(flat.position(&id), Some(4));
        assert_eq!(flat.root().map(|e| e.id.as_str()), Some("0"));
        assert!(!flat.contains(&"0-9".parse().unwrap()));
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let mut node = AstNode::new("Leaf", 0, 0);
        for _ in 0..2_000 {
            node = AstNode::new("Wrap", 0, 0).with_children(vec![node]);
        }
        let flat = flatten(Some(&node));
        assert_eq!(flat.len(), 2_001);
        assert_eq!(flat.last().map(|e| e.level), Some(2_000));
    }
}
