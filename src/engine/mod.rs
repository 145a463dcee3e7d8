//! The evaluation engine: traversal, collection, and autocorrection.

mod autocorrect;
mod collector;
mod runner;
mod traversal;

pub use autocorrect::{resolve_corrections, AppliedFix, CorrectionOutcome, SkipReason, SkippedFix};
pub use collector::collect;
pub use runner::{run_unit, run_unit_files, run_units, RunResult, RunStatus};
pub use traversal::{traverse, NodeContext, TraversalOutcome};
