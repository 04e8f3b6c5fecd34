use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::id::NodeId;
use crate::model::TextRange;

/// Error reported by the external parser, with the location it names (if any).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// 1-based line, or 0 when the message carries no location.
    pub line: usize,
    /// 1-based column, or 0 when the message carries no location.
    pub column: usize,
}

impl ParseError {
    /// Wraps a parser message, extracting `line:column` from a
    /// `file:line:column: text` prefix when present.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let (line, column) = location_prefix(&message).unwrap_or((0, 0));
        Self {
            message,
            line,
            column,
        }
    }

    /// Returns `true` if the parser reported a location.
    pub const fn has_location(&self) -> bool {
        self.line > 0
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// Go-style diagnostics: "input.go:5:10: expected ';', found 'EOF'".
fn location_prefix(message: &str) -> Option<(usize, usize)> {
    let mut parts = message.splitn(4, ':');
    let _file = parts.next()?;
    let line = parts.next()?.trim().parse().ok()?;
    let column = parts.next()?.trim().parse().ok()?;
    parts.next()?;
    Some((line, column))
}

/// Reasons a parser reply did not yield a tree.
#[derive(Debug, Error)]
pub enum ParseFailure {
    /// The parser rejected the source.
    #[error("parse error: {0}")]
    Parser(ParseError),
    /// The reply carried neither a tree nor an error.
    #[error("no AST returned")]
    MissingTree,
    /// The reply or the embedded tree was not valid JSON of the expected shape.
    #[error("malformed parser reply: {0}")]
    Malformed(String),
}

impl ParseFailure {
    /// The parser's own error, if that is what this failure is.
    pub const fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parser(error) => Some(error),
            _ => None,
        }
    }
}

/// A string that is not a well-formed node path.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NodeIdError {
    #[error("node id is empty")]
    Empty,
    #[error("node id must start at the root segment `0`, got `{0}`")]
    NotRooted(String),
    #[error("invalid node id segment `{segment}` in `{id}`")]
    InvalidSegment { id: String, segment: String },
}

/// First place where a tree breaks the range invariants.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RangeViolation {
    #[error("node {id} has start after end ({range:?})")]
    Inverted { id: NodeId, range: TextRange },
    #[error("node {id} ({child:?}) escapes its parent ({parent:?})")]
    Escapes {
        id: NodeId,
        parent: TextRange,
        child: TextRange,
    },
    #[error("node {id} ({range:?}) overlaps or precedes its previous sibling ({previous:?})")]
    Unordered {
        id: NodeId,
        previous: TextRange,
        range: TextRange,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_go_style_location() {
        let error = ParseError::from_message("input.go:5:10: expected ';', found 'EOF'");
        assert_eq!((error.line, error.column), (5, 10));
        assert!(error.has_location());
        assert_eq!(error.to_string(), "input.go:5:10: expected ';', found 'EOF'");
    }

    #[test]
    fn message_without_location_keeps_zero() {
        let error = ParseError::from_message("Parser not initialized");
        assert_eq!((error.line, error.column), (0, 0));
        assert!(!error.has_location());
    }

    #[test]
    fn parse_failure_exposes_parser_error() {
        let failure = ParseFailure::Parser(ParseError::from_message("x.go:1:1: boom"));
        assert_eq!(failure.parse_error().map(|e| e.line), Some(1));
        assert!(ParseFailure::MissingTree.parse_error().is_none());
    }
}
