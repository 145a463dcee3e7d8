//! The parsed-tree contract shared with external parsers.
//!
//! The engine never parses source text itself. A frontend parser emits one
//! serialized `Unit` per analyzed input: the original source plus a tree of
//! `Node`s whose spans index into that source. Everything the engine does is
//! driven by node kind, tree shape, and raw token text.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Syntactic categories the engine dispatches on.
///
/// Deliberately coarse: rules match on shape and token text, so the kind set
/// only needs to be fine enough to subscribe rules to the right nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Root of a unit's tree.
    Program,
    /// Method or function invocation.
    Call,
    /// `if` / `unless` / ternary - anything with a condition child.
    Conditional,
    Assignment,
    /// Binary expression: left, operator token, right.
    Binary,
    /// Unary expression: operator token, operand.
    Unary,
    Literal,
    Identifier,
    /// Constant / module / class reference (uppercase-leading name).
    Constant,
    /// Delimited statement sequence.
    Block,
    /// Parenthesized sub-expression.
    Grouping,
    /// Operator token (`::`, `.`, `and`, `&&`, ...).
    Operator,
    /// Non-operator punctuation token (`{`, `}`, `(`, ...).
    Punct,
    Comment,
    /// Anything the parser has no closer category for.
    Other,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Program => "program",
            NodeKind::Call => "call",
            NodeKind::Conditional => "conditional",
            NodeKind::Assignment => "assignment",
            NodeKind::Binary => "binary",
            NodeKind::Unary => "unary",
            NodeKind::Literal => "literal",
            NodeKind::Identifier => "identifier",
            NodeKind::Constant => "constant",
            NodeKind::Block => "block",
            NodeKind::Grouping => "grouping",
            NodeKind::Operator => "operator",
            NodeKind::Punct => "punct",
            NodeKind::Comment => "comment",
            NodeKind::Other => "other",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A half-open byte range plus 1-indexed line bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl Span {
    pub fn new(start_byte: usize, end_byte: usize, start_line: usize, end_line: usize) -> Self {
        Self {
            start_byte,
            end_byte,
            start_line,
            end_line,
        }
    }

    /// True if the byte ranges share at least one byte.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }

    /// True if `line` falls within this span's line range.
    pub fn covers_line(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    /// True if `other` lies entirely within this span's byte range.
    pub fn contains(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }
}

/// One element of a parsed tree. Immutable after deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// Raw token text for terminals; None for interior nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Terminal token text, or "" for interior nodes.
    pub fn token_text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// Slice of the unit source covered by this node.
    pub fn source_text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.span.start_byte..self.span.end_byte).unwrap_or("")
    }

    /// First child of the given kind.
    pub fn child_of_kind(&self, kind: NodeKind) -> Option<&Node> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Check the structural invariant: children in source order, spans
    /// non-overlapping and inside the parent. Returns the offending node
    /// description on failure.
    pub fn check_shape(&self) -> Result<(), String> {
        let mut prev_end = self.span.start_byte;
        for child in &self.children {
            if !self.span.contains(&child.span) {
                return Err(format!(
                    "{} child at bytes {}..{} escapes parent {} at {}..{}",
                    child.kind,
                    child.span.start_byte,
                    child.span.end_byte,
                    self.kind,
                    self.span.start_byte,
                    self.span.end_byte
                ));
            }
            if child.span.start_byte < prev_end {
                return Err(format!(
                    "{} child at bytes {}..{} overlaps its preceding sibling",
                    child.kind, child.span.start_byte, child.span.end_byte
                ));
            }
            prev_end = child.span.end_byte;
            child.check_shape()?;
        }
        Ok(())
    }
}

/// One analyzed input: source text plus its parsed tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Path of the original source file (for reporting).
    pub path: String,
    pub source: String,
    pub tree: Node,
}

impl Unit {
    /// Load a serialized unit from a JSON file produced by a frontend parser.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let unit: Unit = serde_json::from_str(&content)?;
        Ok(unit)
    }
}
