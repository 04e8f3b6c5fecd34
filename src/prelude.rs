pub use crate::{
    AstNode, ExpansionSet, ExplorerConfig, ExplorerState, FlatEntry, FlatTree, LineIndex,
    MetaValue, NodeId, ParseError, ParseFailure, Position, SyntaxNode, TextRange, TreeAction,
    TreeEvent, VisibleRow, ancestors_of, find_node_at_offset, find_node_id_at_offset, flatten,
    visible_node_ids, visible_rows,
};

#[cfg(feature = "keymap")]
pub use crate::{KeymapProfile, TreeKeyBindings};

#[cfg(feature = "json")]
pub use crate::{ParserReply, decode_reply};
