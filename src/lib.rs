//! Offset mapping, node lookup and tree navigation for AST visualizers.
//!
//! The crate sits between an external parser and a UI: it maps text offsets to
//! line/column positions, finds the node under the cursor, and linearizes the
//! tree into path-addressed rows that can be expanded, collapsed and walked with
//! the keyboard.
//!
//! Feature flags:
//! - `json` (default): decoding of the parser's JSON reply (`decode_reply`).
//! - `serde`: serde support for the data types.
//! - `keymap`: crossterm-based key bindings and `ExplorerState::handle_key*` helpers.

mod action;
mod ast;
mod config;
mod error;
mod flatten;
mod id;
#[cfg(feature = "keymap")]
mod keymap;
mod locate;
mod model;
pub mod navigate;
#[cfg(feature = "json")]
mod payload;
mod position;
pub mod prelude;
mod state;
mod visibility;

pub use action::{TreeAction, TreeEvent};
pub use ast::{AstNode, MetaValue};
pub use config::ExplorerConfig;
pub use error::{NodeIdError, ParseError, ParseFailure, RangeViolation};
pub use flatten::{ChildIds, FlatEntry, FlatTree, flatten};
pub use id::NodeId;
#[cfg(feature = "keymap")]
pub use keymap::{KeymapProfile, TreeKeyBindings};
pub use locate::{ancestors_of, find_node_at_offset, find_node_id_at_offset};
pub use model::{SyntaxNode, TextRange};
#[cfg(feature = "json")]
pub use payload::{ParserReply, decode_reply, decode_tree};
pub use position::{LineIndex, Position};
pub use state::ExplorerState;
pub use visibility::{ExpansionSet, VisibleRow, visible_node_ids, visible_rows};
