//! Directional queries over the visible list and the flattened tree.
//!
//! Every function is pure: unknown ids are answered with `None` (or an empty
//! list) since callers may hold ids from a tree that has since been replaced.

use crate::flatten::FlatTree;
use crate::id::NodeId;
use crate::visibility::ExpansionSet;

/// Id right before `id` in the visible list.
pub fn previous<'v>(id: &NodeId, visible: &'v [NodeId]) -> Option<&'v NodeId> {
    let idx = visible.iter().position(|candidate| candidate == id)?;
    idx.checked_sub(1).map(|prev| &visible[prev])
}

/// Id right after `id` in the visible list.
pub fn next<'v>(id: &NodeId, visible: &'v [NodeId]) -> Option<&'v NodeId> {
    let idx = visible.iter().position(|candidate| candidate == id)?;
    visible.get(idx + 1)
}

#[inline]
pub fn first(visible: &[NodeId]) -> Option<&NodeId> {
    visible.first()
}

#[inline]
pub fn last(visible: &[NodeId]) -> Option<&NodeId> {
    visible.last()
}

/// Parent id, derived from the path alone.
#[inline]
pub fn parent_of(id: &NodeId) -> Option<NodeId> {
    id.parent()
}

/// First child of an expanded node.
///
/// Collapsed nodes never expose a child, even though the tree has one.
pub fn first_child_of<'f, N>(
    id: &NodeId,
    flat: &'f FlatTree<'_, N>,
    expanded: &ExpansionSet,
) -> Option<&'f NodeId> {
    let entry = flat.get(id)?;
    if !expanded.contains(id) {
        return None;
    }
    entry.child_ids.first()
}

/// `id` followed by all of its descendants in pre-order, ignoring expansion.
pub fn descendants_of<N>(id: &NodeId, flat: &FlatTree<'_, N>) -> Vec<NodeId> {
    // Pre-order keeps a subtree contiguous: it ends at the first entry that is
    // not below `id`.
    let Some(start) = flat.position(id) else {
        return Vec::new();
    };
    let entries = flat.entries();
    let level = entries[start].level;
    let mut result = vec![id.clone()];
    result.extend(
        entries[start + 1..]
            .iter()
            .take_while(|entry| entry.level > level)
            .map(|entry| entry.id.clone()),
    );
    result
}
