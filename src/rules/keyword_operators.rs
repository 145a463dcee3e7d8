//! Flags keyword boolean operators where symbolic ones belong.
//!
//! `and`/`or` bind looser than `&&`/`||` and read as control flow, not as
//! boolean logic; `not` likewise stands in for `!`. Each keyword has an
//! unambiguous symbolic rewrite. For `not` the whitespace up to the operand
//! is absorbed, so `not x` becomes `!x` rather than `! x`.

use super::{Edit, Finding, Rule, RuleId, RuleParams, Severity};
use crate::engine::NodeContext;
use crate::tree::{Node, NodeKind};

pub struct KeywordBooleanOperator;

fn symbolic(keyword: &str) -> Option<&'static str> {
    match keyword {
        "and" => Some("&&"),
        "or" => Some("||"),
        "not" => Some("!"),
        _ => None,
    }
}

impl Rule for KeywordBooleanOperator {
    fn id(&self) -> RuleId {
        RuleId("keyword-boolean-operator")
    }

    fn description(&self) -> &'static str {
        "boolean operators must be symbolic (`&&`, `||`, `!`), not keywords"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Binary, NodeKind::Unary]
    }

    fn check(&self, node: &Node, ctx: &NodeContext<'_>, _params: &RuleParams) -> Vec<Finding> {
        let mut findings = Vec::new();

        for op in node
            .children
            .iter()
            .filter(|c| c.kind == NodeKind::Operator)
        {
            let keyword = op.token_text();
            let replacement = match symbolic(keyword) {
                Some(sym) => sym,
                None => continue,
            };

            let mut end = op.span.end_byte;
            if keyword == "not" {
                // Absorb the gap to the operand: `not x` -> `!x`.
                let rest = ctx.source.get(end..).unwrap_or("");
                end += rest.len() - rest.trim_start_matches(' ').len();
            }

            findings.push(
                Finding::new(
                    self.id(),
                    self.default_severity(),
                    op.span,
                    format!("use `{}` instead of `{}`", replacement, keyword),
                )
                .with_edit(Edit::new(op.span.start_byte, end, replacement)),
            );
        }

        findings
    }
}
