//! Command-line interface for styleguard.

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

use crate::config::Config;
use crate::engine::{self, resolve_corrections, RunResult, RunStatus};
use crate::report;
use crate::rules::Registry;
use crate::tree::Unit;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// File suffix for serialized units emitted by frontend parsers.
const UNIT_SUFFIX: &str = ".tree.json";

/// Style rule engine over parsed syntax trees.
///
/// Styleguard consumes serialized parse trees produced by an external
/// frontend, evaluates the configured style rules against them, and reports
/// findings with optional safe rewrites.
#[derive(Parser)]
#[command(name = "styleguard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate style rules against serialized units
    #[command(visible_alias = "check")]
    Lint(LintArgs),
    /// List registered rules
    Rules,
}

/// Arguments for the lint command.
#[derive(Parser)]
pub struct LintArgs {
    /// Path to scan for `.tree.json` units (file or directory)
    pub path: PathBuf,

    /// Path to configuration YAML (default: auto-discover styleguard.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Apply accepted autocorrections, writing corrected source next to
    /// each unit
    #[arg(long)]
    pub fix: bool,

    /// Show suppressed findings in output
    #[arg(long)]
    pub show_suppressed: bool,

    /// Per-unit deadline in milliseconds (overrides configuration)
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Collect serialized unit files under a directory.
fn collect_unit_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).into_iter().filter_entry(|e| {
        // Skip hidden directories, but never the scan root itself
        e.depth() == 0
            || !(e.file_type().is_dir() && e.file_name().to_string_lossy().starts_with('.'))
    }) {
        let entry = entry?;
        if entry.file_type().is_file() {
            let name = entry.file_name().to_string_lossy();
            if name.ends_with(UNIT_SUFFIX) {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Where corrected source goes for a unit file: `foo.rb.tree.json` becomes
/// `foo.rb`, anything else gets a `.fixed` suffix.
fn corrected_path(unit_file: &Path) -> PathBuf {
    let name = unit_file.file_name().and_then(|n| n.to_str()).unwrap_or("");
    match name.strip_suffix(UNIT_SUFFIX) {
        Some(stem) if !stem.is_empty() => unit_file.with_file_name(stem),
        _ => {
            let mut p = unit_file.as_os_str().to_owned();
            p.push(".fixed");
            PathBuf::from(p)
        }
    }
}

/// Run the lint command.
pub fn run_lint(args: &LintArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    // Locate and parse configuration
    let search_dir = if args.path.is_dir() {
        args.path.clone()
    } else {
        args.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    };
    let config_path = args.config.clone().or_else(|| Config::discover(&search_dir));
    let config = match &config_path {
        Some(p) => match Config::parse_file(p) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error parsing configuration: {}", e);
                return Ok(EXIT_ERROR);
            }
        },
        None => Config::default(),
    };

    // Resolve the rule set before touching any unit; configuration errors
    // mean the run would not check what the operator intended.
    let registry = Registry::builtin();
    let resolved = match registry.resolve(&config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Collect unit files
    let unit_files = if args.path.is_file() {
        vec![args.path.clone()]
    } else {
        collect_unit_files(&args.path)?
    };
    if unit_files.is_empty() {
        eprintln!("Warning: no {} units found under {:?}", UNIT_SUFFIX, args.path);
        return Ok(EXIT_SUCCESS);
    }

    let timeout = args
        .timeout_ms
        .or(config.timeout_ms)
        .map(Duration::from_millis);

    // Load units up front so --fix can reach each unit's source; load
    // failures become ParseUnavailable results for those units only.
    let mut loaded: Vec<(PathBuf, Unit)> = Vec::new();
    let mut results: Vec<RunResult> = Vec::new();
    for file in &unit_files {
        match Unit::load(file) {
            Ok(unit) => loaded.push((file.clone(), unit)),
            Err(e) => {
                let path_str = file.to_string_lossy().to_string();
                eprintln!("warning: skipping {}: {}", path_str, e);
                results.push(RunResult::parse_unavailable(path_str, e.to_string()));
            }
        }
    }

    // Analyze in parallel, keeping each result paired with its unit file so
    // --fix never has to look results up by the unit's internal path (two
    // unit files may declare the same one).
    let analyzed: Vec<(&PathBuf, &Unit, RunResult)> = loaded
        .par_iter()
        .map(|(file, unit)| (file, unit, engine::run_unit(unit, &resolved, timeout)))
        .collect();

    results.extend(analyzed.iter().map(|(_, _, r)| r.clone()));
    results.sort_by(|a, b| a.path.cmp(&b.path));

    if args.fix {
        apply_fixes(&analyzed)?;
    }

    // Output
    let config_str = config_path
        .as_deref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();
    match args.format.as_str() {
        "json" => report::write_json(&config_str, &results)?,
        _ => report::write_pretty(&results, args.show_suppressed),
    }

    // Exit-code mapping: 2 when no unit could be analyzed at all, 1 when any
    // error-severity finding survived, 0 otherwise.
    if results
        .iter()
        .all(|r| r.status == RunStatus::ParseUnavailable)
    {
        return Ok(EXIT_ERROR);
    }
    let summary = report::summarize(&results);
    if summary.errors > 0 {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Apply accepted corrections and write the rewritten source files.
fn apply_fixes(analyzed: &[(&PathBuf, &Unit, RunResult)]) -> anyhow::Result<()> {
    for (file, unit, result) in analyzed {
        if result.status != RunStatus::Finished {
            continue;
        }
        if !result.findings.iter().any(|f| f.has_fix()) {
            continue;
        }

        let outcome = resolve_corrections(&unit.source, &result.findings);
        report::write_fix_summary(&result.path, &outcome);
        if outcome.changed() {
            let target = corrected_path(file);
            std::fs::write(&target, &outcome.corrected)?;
            println!("wrote {}", target.display());
        }
    }

    Ok(())
}

/// Run the rules command: list every registered rule.
pub fn run_rules() -> anyhow::Result<i32> {
    let registry = Registry::builtin();

    println!("Registered rules:");
    println!();
    for rule in registry.rules() {
        println!(
            "  {:<32} {:<8} {}",
            rule.id().as_str(),
            rule.default_severity().to_string(),
            rule.description()
        );
    }

    Ok(EXIT_SUCCESS)
}
