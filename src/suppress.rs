//! Inline suppression of findings via comment directives.
//!
//! Directives are read from `Comment` nodes of the parsed tree; the engine
//! never scans raw source text. Recognized forms:
//! - `styleguard:ignore <rule> - <reason>` (trailing, suppresses its own line)
//! - `styleguard:ignore-next-line <rule> - <reason>`
//! - `styleguard:ignore-file <rule> - <reason>` (file header only)
//!
//! `<rule>` is a rule id or `*` for all rules.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::rules::Finding;
use crate::tree::{Node, NodeKind};

/// File-level directives must appear within this many leading lines.
const FILE_DIRECTIVE_MAX_LINE: usize = 10;

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"styleguard:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*?))?\s*$")
        .expect("directive pattern is valid")
});

/// How a suppression applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionKind {
    /// The comment's own line (trailing comment).
    Line,
    /// The line after the comment.
    NextLine,
    /// The whole unit.
    File,
}

/// One parsed suppression directive. Built before collection, consulted by
/// the diagnostic collector, discarded after the run.
#[derive(Debug, Clone, Serialize)]
pub struct Suppression {
    /// Rule id to suppress, or "*" for all rules.
    pub rule: String,
    pub reason: String,
    /// Line of the directive comment (unused for file-level).
    pub line: usize,
    pub kind: SuppressionKind,
}

impl Suppression {
    /// Does this directive silence the given finding?
    pub fn matches(&self, finding: &Finding) -> bool {
        if self.rule != "*" && self.rule != finding.rule.as_str() {
            return false;
        }
        match self.kind {
            SuppressionKind::File => true,
            SuppressionKind::Line => finding.span.covers_line(self.line),
            SuppressionKind::NextLine => finding.span.covers_line(self.line + 1),
        }
    }
}

/// A finding that was silenced, kept for visibility in reports.
#[derive(Debug, Clone, Serialize)]
pub struct SuppressedFinding {
    pub finding: Finding,
    pub suppression: Suppression,
}

/// Collect all suppression directives from the comment nodes of a tree.
pub fn collect_suppressions(tree: &Node) -> Vec<Suppression> {
    let mut suppressions = Vec::new();
    walk_comments(tree, &mut suppressions);
    suppressions
}

fn walk_comments(node: &Node, out: &mut Vec<Suppression>) {
    if node.kind == NodeKind::Comment {
        if let Some(suppression) = parse_directive(node) {
            out.push(suppression);
        }
    }
    for child in &node.children {
        walk_comments(child, out);
    }
}

fn parse_directive(comment: &Node) -> Option<Suppression> {
    let caps = DIRECTIVE.captures(comment.token_text())?;
    let directive = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let rule = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    let reason = caps
        .get(3)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let kind = match directive {
        "ignore" => SuppressionKind::Line,
        "ignore-next-line" => SuppressionKind::NextLine,
        "ignore-file" => {
            // File-wide silencing is only honored in the file header, so a
            // stray directive deep in a unit cannot blank the whole report.
            if comment.span.start_line > FILE_DIRECTIVE_MAX_LINE {
                return None;
            }
            SuppressionKind::File
        }
        _ => return None,
    };

    Some(Suppression {
        rule: rule.to_string(),
        reason,
        line: comment.span.start_line,
        kind,
    })
}

/// Split findings into surviving and suppressed.
pub fn filter_suppressed(
    findings: Vec<Finding>,
    suppressions: &[Suppression],
) -> (Vec<Finding>, Vec<SuppressedFinding>) {
    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for finding in findings {
        match suppressions.iter().find(|s| s.matches(&finding)) {
            Some(s) => suppressed.push(SuppressedFinding {
                finding,
                suppression: s.clone(),
            }),
            None => active.push(finding),
        }
    }

    (active, suppressed)
}
