use smallvec::SmallVec;

use crate::id::NodeId;
use crate::model::SyntaxNode;

type Path = SmallVec<[usize; 16]>;

/// Finds the innermost node whose range covers `offset`.
///
/// Coverage is inclusive on both ends. Children are scanned in order and the
/// first one that yields a match wins, so at a boundary shared by two adjacent
/// siblings the earlier sibling is returned. If no child matches, the covering
/// node itself is the answer.
pub fn find_node_at_offset<N: SyntaxNode>(root: Option<&N>, offset: usize) -> Option<&N> {
    locate(root?, offset).map(|(node, _)| node)
}

/// Same lookup as [`find_node_at_offset`], returning the path id of the match.
pub fn find_node_id_at_offset<N: SyntaxNode>(root: Option<&N>, offset: usize) -> Option<NodeId> {
    let (_, path) = locate(root?, offset)?;
    Some(
        path.into_iter()
            .fold(NodeId::root(), |id, index| id.child(index)),
    )
}

/// Ids of every ancestor of `id`, root first; expanding them reveals `id`'s row.
pub fn ancestors_of(id: &NodeId) -> Vec<NodeId> {
    id.ancestors()
}

// Descends while some child covers the offset. Ranges are assumed nested, so
// once a node covers the offset only its subtree needs inspecting; a child
// that covers the offset but has no covering descendant is itself the match.
fn locate<N: SyntaxNode>(root: &N, offset: usize) -> Option<(&N, Path)> {
    if !root.range().covers(offset) {
        return None;
    }
    let mut node = root;
    let mut path = Path::new();
    while let Some((index, child)) = node
        .children()
        .iter()
        .enumerate()
        .find(|(_, child)| child.range().covers(offset))
    {
        path.push(index);
        node = child;
    }
    Some((node, path))
}
