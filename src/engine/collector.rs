//! Ordering, de-duplication, and suppression of raw traversal findings.

use std::collections::HashSet;

use crate::rules::Finding;
use crate::suppress::{filter_suppressed, Suppression, SuppressedFinding};

/// Turn raw traversal output into the final reported finding list.
///
/// Findings arrive in traversal order; the output is sorted by source
/// position first and rule id second, so reports are deterministic and
/// independent of rule registration order. Identical (rule, span, message)
/// tuples collapse to one finding.
pub fn collect(
    findings: Vec<Finding>,
    suppressions: &[Suppression],
) -> (Vec<Finding>, Vec<SuppressedFinding>) {
    let mut deduped = Vec::with_capacity(findings.len());
    let mut seen: HashSet<String> = HashSet::new();
    for finding in findings {
        let (rule, span, message) = finding.dedup_key();
        let key = format!("{}|{}|{}|{}", rule, span.start_byte, span.end_byte, message);
        if seen.insert(key) {
            deduped.push(finding);
        }
    }

    deduped.sort_by(|a, b| {
        (a.span.start_byte, a.span.end_byte, a.rule)
            .cmp(&(b.span.start_byte, b.span.end_byte, b.rule))
    });

    filter_suppressed(deduped, suppressions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleId, Severity};
    use crate::tree::Span;

    fn finding(rule: &'static str, start: usize, message: &str) -> Finding {
        Finding::new(
            RuleId(rule),
            Severity::Warning,
            Span::new(start, start + 4, 1, 1),
            message,
        )
    }

    #[test]
    fn test_sorted_by_position_then_rule() {
        let raw = vec![
            finding("zeta", 10, "later"),
            finding("beta", 0, "same spot"),
            finding("alpha", 0, "same spot"),
        ];
        let (active, _) = collect(raw, &[]);
        assert_eq!(active.len(), 3);
        assert_eq!(active[0].rule.as_str(), "alpha");
        assert_eq!(active[1].rule.as_str(), "beta");
        assert_eq!(active[2].rule.as_str(), "zeta");
    }

    #[test]
    fn test_identical_tuples_deduped() {
        let raw = vec![
            finding("alpha", 0, "dup"),
            finding("alpha", 0, "dup"),
            finding("alpha", 0, "different message"),
        ];
        let (active, _) = collect(raw, &[]);
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn test_dedup_keeps_distinct_spans() {
        let raw = vec![finding("alpha", 0, "m"), finding("alpha", 8, "m")];
        let (active, _) = collect(raw, &[]);
        assert_eq!(active.len(), 2);
    }
}
