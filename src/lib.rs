//! Styleguard - rule-evaluation engine for static style analysis.
//!
//! Styleguard consumes parsed syntax trees (serialized by an external
//! frontend parser), evaluates a configurable set of structural pattern
//! rules against them in a single traversal, and emits findings with
//! optional safe rewrites. It reasons purely over tree shape and token
//! text; it never executes or type-checks the analyzed code.
//!
//! # Architecture
//!
//! - `tree`: the Node/Span/Unit contract shared with frontend parsers
//! - `rules`: the Rule trait, registry, and built-in pattern matchers
//! - `engine`: traversal, collection, autocorrection, per-unit runner
//! - `suppress`: inline suppression directives read from comment nodes
//! - `config`: YAML configuration surface
//! - `report`: output formatting (pretty, JSON)
//!
//! # Adding a New Rule
//!
//! Implement the `rules::Rule` trait and register it (see
//! `rules::builtin_rules` for examples). Rules subscribe to node kinds and
//! describe rewrites as edits; they never mutate the tree.

pub mod cli;
pub mod config;
pub mod engine;
pub mod report;
pub mod rules;
pub mod suppress;
pub mod tree;

pub use config::Config;
pub use engine::{
    resolve_corrections, run_unit, run_units, CorrectionOutcome, NodeContext, RunResult, RunStatus,
};
pub use rules::{Edit, EngineError, Finding, Registry, Rule, RuleId, Severity};
pub use suppress::{Suppression, SuppressionKind};
pub use tree::{Node, NodeKind, Span, Unit};
