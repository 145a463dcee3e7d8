//! Flags scope-resolution syntax used for plain method calls.
//!
//! `SomeClass::some_method` resolves a method through `::`, which reads like
//! a constant lookup. When the member after `::` is a lowercase identifier
//! (a method, not a constant), the call should use `.` instead. Constant
//! lookups like `SomeClass::SOME_CONST` are untouched.

use super::{Edit, Finding, Rule, RuleId, RuleParams, Severity};
use crate::engine::NodeContext;
use crate::tree::{Node, NodeKind};

pub struct ScopeResolutionMethodCall;

impl Rule for ScopeResolutionMethodCall {
    fn id(&self) -> RuleId {
        RuleId("scope-resolution-method-call")
    }

    fn description(&self) -> &'static str {
        "method calls must use `.`, not scope-resolution `::`"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Call]
    }

    fn check(&self, node: &Node, _ctx: &NodeContext<'_>, _params: &RuleParams) -> Vec<Finding> {
        let op_idx = match node
            .children
            .iter()
            .position(|c| c.kind == NodeKind::Operator && c.token_text() == "::")
        {
            Some(idx) => idx,
            None => return Vec::new(),
        };
        let op = &node.children[op_idx];

        // The member after `::` must be a plain identifier; a Constant there
        // means this is a namespace lookup, which `::` is for.
        let member = match node.children.get(op_idx + 1) {
            Some(m) if m.kind == NodeKind::Identifier => m,
            _ => return Vec::new(),
        };

        vec![Finding::new(
            self.id(),
            self.default_severity(),
            node.span,
            format!(
                "use `.` instead of `::` to call method `{}`",
                member.token_text()
            ),
        )
        .with_edit(Edit::new(op.span.start_byte, op.span.end_byte, "."))]
    }
}
