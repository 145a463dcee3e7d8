//! Flags lines that exceed a configurable length.
//!
//! Purely lexical and anchored at the unit root, so it fires once per long
//! line regardless of tree shape. The limit comes from the `max` rule param
//! and defaults to 100 characters.

use super::{Finding, Rule, RuleId, RuleParams, Severity};
use crate::engine::NodeContext;
use crate::tree::{Node, NodeKind, Span};

const DEFAULT_MAX: usize = 100;

pub struct LineLength;

impl Rule for LineLength {
    fn id(&self) -> RuleId {
        RuleId("line-length")
    }

    fn description(&self) -> &'static str {
        "lines must not exceed the configured maximum length"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Program]
    }

    fn check(&self, _node: &Node, ctx: &NodeContext<'_>, params: &RuleParams) -> Vec<Finding> {
        let max = params.get_usize("max").unwrap_or(DEFAULT_MAX);
        let mut findings = Vec::new();
        let mut offset = 0;

        for (i, line) in ctx.source.split('\n').enumerate() {
            let line_number = i + 1;
            let trimmed = line.strip_suffix('\r').unwrap_or(line);
            let width = trimmed.chars().count();
            if width > max {
                findings.push(Finding::new(
                    self.id(),
                    self.default_severity(),
                    Span::new(offset, offset + trimmed.len(), line_number, line_number),
                    format!("line is {} characters (max {})", width, max),
                ));
            }
            offset += line.len() + 1;
        }

        findings
    }
}
