//! Flags parenthesized conditions in conditionals.
//!
//! `if (x > 10)` carries no grouping information the conditional does not
//! already provide; the condition should read `if x > 10`. The whole
//! grouping span is rewritten to its inner text, which keeps the fix a
//! single edit and leaves surrounding spacing alone.

use super::{Edit, Finding, Rule, RuleId, RuleParams, Severity};
use crate::engine::NodeContext;
use crate::tree::{Node, NodeKind};

pub struct RedundantConditionParens;

impl Rule for RedundantConditionParens {
    fn id(&self) -> RuleId {
        RuleId("redundant-condition-parens")
    }

    fn description(&self) -> &'static str {
        "conditions must not be wrapped in redundant parentheses"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Conditional]
    }

    fn check(&self, node: &Node, ctx: &NodeContext<'_>, _params: &RuleParams) -> Vec<Finding> {
        // The condition is the first non-token child; redundant wrapping
        // shows up as a Grouping in that position.
        let condition = match node
            .children
            .iter()
            .find(|c| !matches!(c.kind, NodeKind::Operator | NodeKind::Punct))
        {
            Some(c) if c.kind == NodeKind::Grouping => c,
            _ => return Vec::new(),
        };

        let grouped = condition.source_text(ctx.source);
        let inner = grouped
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .map(str::trim);
        let inner = match inner {
            Some(text) if !text.is_empty() => text,
            _ => return Vec::new(),
        };

        vec![Finding::new(
            self.id(),
            self.default_severity(),
            condition.span,
            "redundant parentheses around condition",
        )
        .with_edit(Edit::new(
            condition.span.start_byte,
            condition.span.end_byte,
            inner,
        ))]
    }
}
