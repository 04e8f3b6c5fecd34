use rustc_hash::{FxBuildHasher, FxHashSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::flatten::{FlatEntry, FlatTree};
use crate::id::NodeId;
use crate::navigate::descendants_of;

/// Ids of the nodes whose children are currently shown.
///
/// Owned by the caller. Ids that are not part of the current tree are harmless;
/// they are ignored by every query.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpansionSet {
    expanded: FxHashSet<NodeId>,
}

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            expanded: FxHashSet::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    #[inline]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.expanded.contains(id)
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.expanded.iter()
    }

    /// Marks the node as expanded; returns `true` if it was collapsed before.
    pub fn expand(&mut self, id: NodeId) -> bool {
        self.expanded.insert(id)
    }

    /// Marks the node as collapsed; returns `true` if it was expanded before.
    pub fn collapse(&mut self, id: &NodeId) -> bool {
        self.expanded.remove(id)
    }

    /// Flips the node's state and returns the new one.
    pub fn toggle(&mut self, id: &NodeId) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.clone());
            true
        }
    }

    pub fn set_expanded(&mut self, id: &NodeId, expand: bool) {
        if expand {
            self.expanded.insert(id.clone());
        } else {
            self.expanded.remove(id);
        }
    }

    /// Expands every node that has children.
    pub fn expand_all<N>(&mut self, flat: &FlatTree<'_, N>) {
        self.expanded.clear();
        self.expanded.extend(
            flat.iter()
                .filter(|entry| entry.has_children())
                .map(|entry| entry.id.clone()),
        );
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Expands `id` and every descendant that has children.
    pub fn expand_subtree<N>(&mut self, id: &NodeId, flat: &FlatTree<'_, N>) {
        for node_id in descendants_of(id, flat) {
            if flat.get(&node_id).is_some_and(FlatEntry::has_children) {
                self.expanded.insert(node_id);
            }
        }
    }

    /// Collapses `id` and every descendant.
    pub fn collapse_subtree<N>(&mut self, id: &NodeId, flat: &FlatTree<'_, N>) {
        for node_id in descendants_of(id, flat) {
            self.expanded.remove(&node_id);
        }
    }

    /// Expands every ancestor of `id` so that the node becomes visible.
    pub fn expand_to(&mut self, id: &NodeId) {
        self.expanded.extend(id.ancestors());
    }

    /// Expands every node with children above `depth` (depth 1 = root only).
    pub fn expand_to_depth<N>(&mut self, flat: &FlatTree<'_, N>, depth: u16) {
        self.expanded.extend(
            flat.iter()
                .filter(|entry| entry.level < depth && entry.has_children())
                .map(|entry| entry.id.clone()),
        );
    }

    /// Drops ids that do not name an expandable node of `flat`.
    pub fn retain_existing<N>(&mut self, flat: &FlatTree<'_, N>) -> usize {
        let before = self.expanded.len();
        self.expanded
            .retain(|id| flat.get(id).is_some_and(FlatEntry::has_children));
        before - self.expanded.len()
    }
}

impl FromIterator<NodeId> for ExpansionSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            expanded: iter.into_iter().collect(),
        }
    }
}

impl Extend<NodeId> for ExpansionSet {
    fn extend<I: IntoIterator<Item = NodeId>>(&mut self, iter: I) {
        self.expanded.extend(iter);
    }
}

/// A visible row with the metadata a renderer needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: NodeId,
    pub level: u16,
    pub has_children: bool,
    pub is_expanded: bool,
}

/// Ids of the rows currently shown, in pre-order.
///
/// A single pass over the flattened entries: an entry whose parent is hidden is
/// hidden too, and a visible entry with children that is not expanded hides its
/// children. The root has no parent and is always visible.
pub fn visible_node_ids<N>(entries: &[FlatEntry<'_, N>], expanded: &ExpansionSet) -> Vec<NodeId> {
    let mut visible = Vec::new();
    walk_visible(entries, expanded, |entry| visible.push(entry.id.clone()));
    visible
}

/// Same pass as [`visible_node_ids`], returning row metadata.
pub fn visible_rows<N>(entries: &[FlatEntry<'_, N>], expanded: &ExpansionSet) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    walk_visible(entries, expanded, |entry| {
        rows.push(VisibleRow {
            id: entry.id.clone(),
            level: entry.level,
            has_children: entry.has_children(),
            is_expanded: entry.has_children() && expanded.contains(&entry.id),
        });
    });
    rows
}

fn walk_visible<'e, 'a: 'e, N>(
    entries: &'e [FlatEntry<'a, N>],
    expanded: &ExpansionSet,
    mut emit: impl FnMut(&'e FlatEntry<'a, N>),
) {
    let mut hidden: FxHashSet<&NodeId> = FxHashSet::default();
    for entry in entries {
        if entry.parent.as_ref().is_some_and(|parent| hidden.contains(parent)) {
            hidden.insert(&entry.id);
            continue;
        }

        emit(entry);

        if entry.has_children() && !expanded.contains(&entry.id) {
            hidden.insert(&entry.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstNode;
    use crate::flatten::flatten;

    fn id(s: &str) -> NodeId {
        s.parse().unwrap()
    }

    fn set(ids: &[&str]) -> ExpansionSet {
        ids.iter().map(|s| id(s)).collect()
    }

    fn strings(ids: &[NodeId]) -> Vec<&str> {
        ids.iter().map(NodeId::as_str).collect()
    }

    // File{A, B{C, D}}
    fn small_tree() -> AstNode {
        AstNode::new("File", 0, 30).with_children(vec![
            AstNode::new("A", 0, 5),
            AstNode::new("B", 6, 30).with_children(vec![
                AstNode::new("C", 6, 10),
                AstNode::new("D", 11, 30),
            ]),
        ])
    }

    #[test]
    fn collapsed_child_hides_its_subtree() {
        let tree = small_tree();
        let flat = flatten(Some(&tree));
        let visible = visible_node_ids(&flat, &set(&["0"]));
        assert_eq!(strings(&visible), vec!["0", "0-0", "0-1"]);
    }

    #[test]
    fn expanded_path_shows_everything() {
        let tree = small_tree();
        let flat = flatten(Some(&tree));
        let visible = visible_node_ids(&flat, &set(&["0", "0-1"]));
        assert_eq!(strings(&visible), vec!["0", "0-0", "0-1", "0-1-0", "0-1-1"]);
    }

    #[test]
    fn only_root_when_nothing_is_expanded() {
        let tree = small_tree();
        let flat = flatten(Some(&tree));
        assert_eq!(strings(&visible_node_ids(&flat, &ExpansionSet::new())), vec!["0"]);
    }

    #[test]
    fn expanded_descendant_of_collapsed_node_stays_hidden() {
        let tree = small_tree();
        let flat = flatten(Some(&tree));
        let visible = visible_node_ids(&flat, &set(&["0-1"]));
        assert_eq!(strings(&visible), vec!["0"]);
    }

    #[test]
    fn absent_tree_has_no_rows() {
        let flat = flatten::<AstNode>(None);
        assert!(visible_node_ids(&flat, &set(&["0"])).is_empty());
    }

    #[test]
    fn rows_carry_level_and_expansion() {
        let tree = small_tree();
        let flat = flatten(Some(&tree));
        let rows = visible_rows(&flat, &set(&["0"]));
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_expanded);
        assert_eq!(rows[2].level, 1);
        assert!(rows[2].has_children);
        assert!(!rows[2].is_expanded);
        assert!(!rows[1].has_children);
    }

    #[test]
    fn bulk_operations_follow_the_tree() {
        let tree = small_tree();
        let flat = FlatTree::new(Some(&tree));

        let mut expanded = ExpansionSet::new();
        expanded.expand_all(&flat);
        assert_eq!(expanded, set(&["0", "0-1"]));

        expanded.collapse_subtree(&id("0"), &flat);
        assert!(expanded.is_empty());

        expanded.expand_subtree(&id("0-1"), &flat);
        assert_eq!(expanded, set(&["0-1"]));

        expanded.expand_to(&id("0-1-1"));
        assert_eq!(expanded, set(&["0", "0-1"]));

        expanded.collapse_all();
        expanded.expand_to_depth(&flat, 1);
        assert_eq!(expanded, set(&["0"]));
    }

    #[test]
    fn toggle_flips_state() {
        let mut expanded = ExpansionSet::new();
        assert!(expanded.toggle(&id("0")));
        assert!(expanded.contains(&id("0")));
        assert!(!expanded.toggle(&id("0")));
        assert!(expanded.is_empty());
    }

    #[test]
    fn retain_existing_drops_stale_ids() {
        let tree = small_tree();
        let flat = FlatTree::new(Some(&tree));
        // "0-0" is a leaf and "0-7" does not exist.
        let mut expanded = set(&["0", "0-0", "0-1", "0-7"]);
        assert_eq!(expanded.retain_existing(&flat), 2);
        assert_eq!(expanded, set(&["0", "0-1"]));
    }
}
