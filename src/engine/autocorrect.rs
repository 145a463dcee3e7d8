//! Arbitration and application of suggested rewrites.
//!
//! Rules never touch the tree; they only describe byte ranges and
//! replacement text. This module is the single place edits get applied, so
//! aliasing and iterator-invalidation hazards cannot arise anywhere else.

use serde::Serialize;

use crate::rules::{Edit, Finding, RuleId};
use crate::tree::Span;

/// A finding whose edit set was applied to the corrected output.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedFix {
    pub rule: RuleId,
    pub span: Span,
}

/// Why a finding's edit set was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Overlaps the accepted edits of an earlier finding from this rule.
    Conflict { with: RuleId },
    /// An edit range does not index valid source text.
    OutOfBounds,
}

/// A finding whose edit set was not applied. Reported rather than silently
/// dropped.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFix {
    pub rule: RuleId,
    pub span: Span,
    pub reason: SkipReason,
}

/// The rewritten source plus a full account of what was and wasn't applied.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionOutcome {
    pub corrected: String,
    pub applied: Vec<AppliedFix>,
    pub skipped: Vec<SkippedFix>,
}

impl CorrectionOutcome {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// True if the edit's byte range indexes valid source text.
fn edit_fits(source: &str, edit: &Edit) -> bool {
    edit.start_byte <= edit.end_byte
        && source.is_char_boundary(edit.start_byte)
        && source.is_char_boundary(edit.end_byte)
}

/// Select and apply non-conflicting edit sets from the sorted finding list.
///
/// Findings are walked in source order; an edit set is accepted greedily iff
/// all of its ranges index valid source text and none overlap a previously
/// accepted range (source-order precedence - the earlier finding wins).
/// Accepted edits are applied in one pass from the end of the source
/// backward so earlier offsets stay valid.
pub fn resolve_corrections(source: &str, findings: &[Finding]) -> CorrectionOutcome {
    let mut accepted: Vec<(Edit, RuleId)> = Vec::new();
    let mut applied = Vec::new();
    let mut skipped = Vec::new();

    for finding in findings.iter().filter(|f| f.has_fix()) {
        if !finding.edits.iter().all(|e| edit_fits(source, e)) {
            skipped.push(SkippedFix {
                rule: finding.rule,
                span: finding.span,
                reason: SkipReason::OutOfBounds,
            });
            continue;
        }

        let conflict = finding
            .edits
            .iter()
            .find_map(|e| {
                accepted
                    .iter()
                    .find(|(a, _)| a.overlaps(e))
                    .map(|(_, rule)| *rule)
            });

        match conflict {
            Some(winner) => skipped.push(SkippedFix {
                rule: finding.rule,
                span: finding.span,
                reason: SkipReason::Conflict { with: winner },
            }),
            None => {
                for edit in &finding.edits {
                    accepted.push((edit.clone(), finding.rule));
                }
                applied.push(AppliedFix {
                    rule: finding.rule,
                    span: finding.span,
                });
            }
        }
    }

    // End-to-start so each splice leaves preceding offsets untouched.
    accepted.sort_by(|a, b| b.0.start_byte.cmp(&a.0.start_byte));
    let mut corrected = source.to_string();
    for (edit, _) in &accepted {
        corrected.replace_range(edit.start_byte..edit.end_byte, &edit.replacement);
    }

    CorrectionOutcome {
        corrected,
        applied,
        skipped,
    }
}
