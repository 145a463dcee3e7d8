//! Output formatting for analysis results.
//!
//! Two formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;

use crate::engine::{CorrectionOutcome, RunResult, RunStatus, SkipReason};
use crate::rules::Severity;

/// Aggregate counts over all units in a run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Summary {
    pub units: usize,
    pub finished: usize,
    pub cancelled: usize,
    pub parse_unavailable: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub suppressed: usize,
}

pub fn summarize(results: &[RunResult]) -> Summary {
    let mut summary = Summary {
        units: results.len(),
        ..Default::default()
    };
    for result in results {
        match result.status {
            RunStatus::Finished => summary.finished += 1,
            RunStatus::Cancelled => summary.cancelled += 1,
            RunStatus::ParseUnavailable => summary.parse_unavailable += 1,
        }
        for finding in &result.findings {
            match finding.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
        }
        summary.suppressed += result.suppressed.len();
    }
    summary
}

/// JSON report envelope.
#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'a str,
    config: &'a str,
    summary: Summary,
    units: &'a [RunResult],
}

/// Write results as one JSON document to stdout.
pub fn write_json(config_path: &str, results: &[RunResult]) -> anyhow::Result<()> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        config: config_path,
        summary: summarize(results),
        units: results,
    };
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".cyan(),
    }
}

/// Write colored human-readable results to stdout.
pub fn write_pretty(results: &[RunResult], show_suppressed: bool) {
    for result in results {
        match result.status {
            RunStatus::ParseUnavailable => {
                println!(
                    "{} {} ({})",
                    "skipped".magenta().bold(),
                    result.path,
                    result.error.as_deref().unwrap_or("tree unavailable")
                );
                continue;
            }
            RunStatus::Cancelled => {
                println!(
                    "{} {} (deadline exceeded)",
                    "cancelled".magenta().bold(),
                    result.path
                );
                continue;
            }
            RunStatus::Finished => {}
        }

        for finding in &result.findings {
            let fixable = if finding.has_fix() {
                " [fixable]".green().to_string()
            } else {
                String::new()
            };
            println!(
                "{}:{}: {} {} ({}){}",
                result.path,
                finding.span.start_line,
                severity_label(finding.severity),
                finding.message,
                finding.rule.as_str().dimmed(),
                fixable
            );
        }

        if show_suppressed {
            for sv in &result.suppressed {
                let reason = if sv.suppression.reason.is_empty() {
                    String::new()
                } else {
                    format!(" - {}", sv.suppression.reason)
                };
                println!(
                    "{}:{}: {} {} ({}){}",
                    result.path,
                    sv.finding.span.start_line,
                    "suppressed".dimmed(),
                    sv.finding.message,
                    sv.finding.rule.as_str().dimmed(),
                    reason.dimmed()
                );
            }
        }
    }

    let summary = summarize(results);
    println!();
    println!(
        "{} unit(s): {} error(s), {} warning(s), {} info",
        summary.units, summary.errors, summary.warnings, summary.infos
    );
    if summary.suppressed > 0 && !show_suppressed {
        println!(
            "{} finding(s) suppressed (use --show-suppressed to list them)",
            summary.suppressed
        );
    }
    if summary.cancelled > 0 {
        println!("{} unit(s) cancelled", summary.cancelled);
    }
    if summary.parse_unavailable > 0 {
        println!(
            "{} unit(s) skipped: tree unavailable",
            summary.parse_unavailable
        );
    }
}

/// Print what the autocorrection pass did for one unit.
pub fn write_fix_summary(path: &str, outcome: &CorrectionOutcome) {
    for applied in &outcome.applied {
        println!(
            "{}:{}: {} {}",
            path,
            applied.span.start_line,
            "fixed".green().bold(),
            applied.rule.as_str()
        );
    }
    for skipped in &outcome.skipped {
        let why = match skipped.reason {
            SkipReason::Conflict { with } => format!("conflicts with {}", with),
            SkipReason::OutOfBounds => "edit out of bounds".to_string(),
        };
        println!(
            "{}:{}: {} {} ({})",
            path,
            skipped.span.start_line,
            "fix skipped".yellow().bold(),
            skipped.rule.as_str(),
            why
        );
    }
}
