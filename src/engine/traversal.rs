//! Single-pass tree traversal and rule dispatch.
//!
//! The engine makes exactly one depth-first pre-order walk per unit. Every
//! active rule subscribed to a node's kind is consulted at that node, in
//! registration order. A rule that panics is isolated: the panic becomes an
//! info-severity finding attributed to that rule at that node and the walk
//! continues with all other rules.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::rules::{Finding, ResolvedRules, Severity};
use crate::tree::{Node, Unit};

/// Read-only surroundings of the node a rule is being consulted about.
pub struct NodeContext<'a> {
    /// The unit's source text.
    pub source: &'a str,
    /// Path from the root down to (excluding) the current node.
    pub ancestors: &'a [&'a Node],
    /// Position among the parent's children; 0 for the root.
    pub sibling_index: usize,
    /// Preceding sibling, for token lookups like trailing modifiers.
    pub prev_sibling: Option<&'a Node>,
    /// Following sibling, for same-line placement checks.
    pub next_sibling: Option<&'a Node>,
}

impl<'a> NodeContext<'a> {
    /// Nearest enclosing node, if any.
    pub fn parent(&self) -> Option<&'a Node> {
        self.ancestors.last().copied()
    }
}

/// How a single-unit walk ended.
pub enum TraversalOutcome {
    Completed(Vec<Finding>),
    /// The deadline passed between top-level child visits.
    Cancelled,
}

/// Walk the unit's tree once, dispatching to all subscribed rules per node.
///
/// The deadline is checked cooperatively between top-level child visits, so
/// a pathological tree can be abandoned without blocking other workers. A
/// cancelled walk yields no partial findings.
pub fn traverse(
    unit: &Unit,
    resolved: &ResolvedRules<'_>,
    deadline: Option<Instant>,
) -> TraversalOutcome {
    let mut findings = Vec::new();
    let mut ancestors: Vec<&Node> = Vec::new();
    let root = &unit.tree;

    dispatch(root, 0, None, None, &unit.source, &ancestors, resolved, &mut findings);

    ancestors.push(root);
    for (i, child) in root.children.iter().enumerate() {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return TraversalOutcome::Cancelled;
            }
        }
        let prev = i.checked_sub(1).and_then(|p| root.children.get(p));
        let next = root.children.get(i + 1);
        visit(
            child,
            i,
            prev,
            next,
            &unit.source,
            resolved,
            &mut ancestors,
            &mut findings,
        );
    }

    TraversalOutcome::Completed(findings)
}

/// Recursive pre-order visit below the top level.
#[allow(clippy::too_many_arguments)]
fn visit<'t>(
    node: &'t Node,
    sibling_index: usize,
    prev_sibling: Option<&'t Node>,
    next_sibling: Option<&'t Node>,
    source: &str,
    resolved: &ResolvedRules<'_>,
    ancestors: &mut Vec<&'t Node>,
    findings: &mut Vec<Finding>,
) {
    dispatch(
        node,
        sibling_index,
        prev_sibling,
        next_sibling,
        source,
        ancestors,
        resolved,
        findings,
    );

    ancestors.push(node);
    for (i, child) in node.children.iter().enumerate() {
        let prev = i.checked_sub(1).and_then(|p| node.children.get(p));
        let next = node.children.get(i + 1);
        visit(child, i, prev, next, source, resolved, ancestors, findings);
    }
    ancestors.pop();
}

/// Consult every subscribed rule for one node, isolating rule panics.
#[allow(clippy::too_many_arguments)]
fn dispatch(
    node: &Node,
    sibling_index: usize,
    prev_sibling: Option<&Node>,
    next_sibling: Option<&Node>,
    source: &str,
    ancestors: &[&Node],
    resolved: &ResolvedRules<'_>,
    findings: &mut Vec<Finding>,
) {
    let subscribed = resolved.subscribed(node.kind);
    if subscribed.is_empty() {
        return;
    }

    let ctx = NodeContext {
        source,
        ancestors,
        sibling_index,
        prev_sibling,
        next_sibling,
    };

    for &idx in subscribed {
        let active = resolved.get(idx);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            active.rule.check(node, &ctx, &active.params)
        }));
        match result {
            Ok(matched) => {
                for mut finding in matched {
                    finding.severity = active.severity;
                    findings.push(finding);
                }
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                eprintln!(
                    "warning: rule {} crashed at {}:{}: {}",
                    active.rule.id(),
                    node.kind,
                    node.span.start_line,
                    reason
                );
                findings.push(Finding::new(
                    active.rule.id(),
                    Severity::Info,
                    node.span,
                    format!("rule crashed while matching this node: {}", reason),
                ));
            }
        }
    }
}

/// Best-effort extraction of a panic payload message.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
