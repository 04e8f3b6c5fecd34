//! Decoding of the external parser's reply.
//!
//! The parser answers with `{"ast": "<tree json>"}` or `{"error": "<message>"}`.
//! Tree nodes on the wire look like
//! `{"type": "Ident", "pos": 9, "end": 13, "children": [], "metadata": {...}, "fieldName": "Name"}`
//! with positions counted from a parser-specific base.

use std::collections::BTreeMap;
use std::vec;

use serde::Deserialize;

use crate::ast::{AstNode, MetaValue};
use crate::config::ExplorerConfig;
use crate::error::{ParseError, ParseFailure};
use crate::model::TextRange;

/// The parser's reply, with the tree still serialized.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ParserReply {
    #[serde(default)]
    pub ast: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ParserReply {
    /// Parses the reply envelope.
    pub fn from_json(json: &str) -> Result<Self, ParseFailure> {
        serde_json::from_str(json).map_err(malformed)
    }

    /// Turns the reply into a tree; a reported error wins over a tree.
    ///
    /// Empty strings count as absent, so `{"ast": ""}` is a missing tree.
    pub fn into_tree(self, config: &ExplorerConfig) -> Result<AstNode, ParseFailure> {
        if let Some(message) = self.error.filter(|m| !m.is_empty()) {
            return Err(ParseFailure::Parser(ParseError::from_message(message)));
        }
        let ast = self
            .ast
            .filter(|a| !a.is_empty())
            .ok_or(ParseFailure::MissingTree)?;
        decode_tree(&ast, config.position_base)
    }
}

/// Decodes a full parser reply.
pub fn decode_reply(json: &str, config: &ExplorerConfig) -> Result<AstNode, ParseFailure> {
    ParserReply::from_json(json)?.into_tree(config)
}

/// Decodes a bare serialized tree, rebasing positions so the first byte is offset 0.
///
/// Nesting depth is unbounded: the deserializer grows its stack on demand and
/// the conversion into [`AstNode`] is iterative.
pub fn decode_tree(json: &str, position_base: usize) -> Result<AstNode, ParseFailure> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let wire = WireNode::deserialize(serde_stacker::Deserializer::new(&mut de))
        .map_err(malformed)?;
    de.end().map_err(malformed)?;
    let tree = wire.into_ast(position_base);
    if let Err(violation) = tree.check_ranges() {
        log::warn!("parser tree breaks range nesting: {violation}");
    }
    Ok(tree)
}

fn malformed(error: serde_json::Error) -> ParseFailure {
    ParseFailure::Malformed(error.to_string())
}

// Nil nodes and slices come through as zero positions and nulls.
#[derive(Deserialize)]
struct WireNode {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    pos: usize,
    #[serde(default)]
    end: usize,
    #[serde(default)]
    children: Option<Vec<WireNode>>,
    #[serde(default)]
    metadata: Option<BTreeMap<String, MetaValue>>,
    #[serde(rename = "fieldName", default)]
    field_name: Option<String>,
}

type Pending = (AstNode, vec::IntoIter<WireNode>);

impl WireNode {
    // Post-order conversion with an explicit stack of half-built parents.
    fn into_ast(self, base: usize) -> AstNode {
        let mut parents: Vec<Pending> = Vec::new();
        let mut current = self.split(base);
        loop {
            if let Some(child) = current.1.next() {
                parents.push(current);
                current = child.split(base);
                continue;
            }
            let (node, _) = current;
            match parents.pop() {
                Some(mut parent) => {
                    parent.0.children.push(node);
                    current = parent;
                }
                None => return node,
            }
        }
    }

    // The node without children, plus the wire children still to convert.
    fn split(self, base: usize) -> Pending {
        let start = self.pos.saturating_sub(base);
        let end = self.end.saturating_sub(base).max(start);
        let children = self.children.unwrap_or_default();
        let node = AstNode {
            kind: self.kind,
            range: TextRange::new(start, end),
            children: Vec::with_capacity(children.len()),
            metadata: self.metadata.unwrap_or_default(),
            field_name: self.field_name.filter(|name| !name.is_empty()),
        };
        (node, children.into_iter())
    }
}
