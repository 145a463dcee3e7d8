//! Flags brace-delimited blocks that span multiple lines.
//!
//! Brace delimiters read well on one line; a block that has grown across
//! lines should switch to the wordy delimiter form. No autocorrection is
//! offered: the rewrite moves delimiters across lines and is not a single
//! unambiguous text substitution.

use super::{Finding, Rule, RuleId, RuleParams, Severity};
use crate::engine::NodeContext;
use crate::tree::{Node, NodeKind};

pub struct MultilineBraceBlock;

impl Rule for MultilineBraceBlock {
    fn id(&self) -> RuleId {
        RuleId("multiline-brace-block")
    }

    fn description(&self) -> &'static str {
        "multi-line blocks must not use brace delimiters"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Block]
    }

    fn check(&self, node: &Node, _ctx: &NodeContext<'_>, _params: &RuleParams) -> Vec<Finding> {
        if node.span.start_line == node.span.end_line {
            return Vec::new();
        }

        let braced = matches!(
            (node.children.first(), node.children.last()),
            (Some(open), Some(close))
                if open.kind == NodeKind::Punct
                    && open.token_text() == "{"
                    && close.kind == NodeKind::Punct
                    && close.token_text() == "}"
        );
        if !braced {
            return Vec::new();
        }

        vec![Finding::new(
            self.id(),
            self.default_severity(),
            node.span,
            format!(
                "block spanning lines {}-{} uses brace delimiters",
                node.span.start_line, node.span.end_line
            ),
        )]
    }
}
