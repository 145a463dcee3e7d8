//! Per-unit orchestration and the cross-unit worker pool.
//!
//! Within one unit everything is synchronous and single-threaded, so
//! ordering is fully deterministic and needs no locking. Across units the
//! work is embarrassingly parallel: the only shared structure is the
//! read-only resolved rule set, built once before the workers start.

use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::collector;
use super::traversal::{self, TraversalOutcome};
use crate::rules::{Finding, ResolvedRules, Severity};
use crate::suppress::{self, SuppressedFinding};
use crate::tree::Unit;

/// How an analysis of one unit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Finished,
    /// The per-unit deadline expired; no partial findings are reported.
    Cancelled,
    /// The unit's tree was missing or malformed; the unit is skipped.
    ParseUnavailable,
}

/// The engine's terminal output for one unit. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub path: String,
    pub status: RunStatus,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<SuppressedFinding>,
    /// Populated for `ParseUnavailable` results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    fn finished(path: String, findings: Vec<Finding>, suppressed: Vec<SuppressedFinding>) -> Self {
        Self {
            path,
            status: RunStatus::Finished,
            findings,
            suppressed,
            error: None,
        }
    }

    fn cancelled(path: String) -> Self {
        Self {
            path,
            status: RunStatus::Cancelled,
            findings: Vec::new(),
            suppressed: Vec::new(),
            error: None,
        }
    }

    pub fn parse_unavailable(path: String, error: String) -> Self {
        Self {
            path,
            status: RunStatus::ParseUnavailable,
            findings: Vec::new(),
            suppressed: Vec::new(),
            error: Some(error),
        }
    }

    /// True when the unit finished with no error-severity findings.
    pub fn passed(&self) -> bool {
        self.status == RunStatus::Finished
            && !self.findings.iter().any(|f| f.severity >= Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity >= Severity::Error)
            .count()
    }
}

/// Analyze one unit with the resolved rule set.
///
/// Stateless and safe to re-invoke: the engine holds nothing between calls.
pub fn run_unit(unit: &Unit, resolved: &ResolvedRules<'_>, timeout: Option<Duration>) -> RunResult {
    if let Err(reason) = unit.tree.check_shape() {
        eprintln!("warning: skipping {}: malformed tree: {}", unit.path, reason);
        return RunResult::parse_unavailable(unit.path.clone(), reason);
    }

    let suppressions = suppress::collect_suppressions(&unit.tree);
    let deadline = timeout.map(|t| Instant::now() + t);

    match traversal::traverse(unit, resolved, deadline) {
        TraversalOutcome::Cancelled => RunResult::cancelled(unit.path.clone()),
        TraversalOutcome::Completed(raw) => {
            let (findings, suppressed) = collector::collect(raw, &suppressions);
            RunResult::finished(unit.path.clone(), findings, suppressed)
        }
    }
}

/// Analyze many units on a bounded worker pool.
///
/// Results come back sorted by unit path regardless of completion order.
pub fn run_units(
    units: &[Unit],
    resolved: &ResolvedRules<'_>,
    timeout: Option<Duration>,
) -> Vec<RunResult> {
    let mut results: Vec<RunResult> = units
        .par_iter()
        .map(|unit| run_unit(unit, resolved, timeout))
        .collect();
    results.sort_by(|a, b| a.path.cmp(&b.path));
    results
}

/// Load serialized unit files and analyze them in parallel.
///
/// A file that fails to load or deserialize becomes a `ParseUnavailable`
/// result for that unit only; the rest of the run continues.
pub fn run_unit_files(
    paths: &[PathBuf],
    resolved: &ResolvedRules<'_>,
    timeout: Option<Duration>,
) -> Vec<RunResult> {
    let mut results: Vec<RunResult> = paths
        .par_iter()
        .map(|path| match Unit::load(path) {
            Ok(unit) => run_unit(&unit, resolved, timeout),
            Err(e) => {
                let path_str = path.to_string_lossy().to_string();
                eprintln!("warning: skipping {}: {}", path_str, e);
                RunResult::parse_unavailable(path_str, e.to_string())
            }
        })
        .collect();
    results.sort_by(|a, b| a.path.cmp(&b.path));
    results
}
