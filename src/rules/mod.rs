//! Rule definitions and the rule registry.
//!
//! A rule is a named structural predicate over the parsed tree. Rules are
//! registered once at startup and are immutable afterwards; enable/disable
//! and severity overrides live in configuration, not in the rule itself.

mod keyword_operators;
mod line_length;
mod multiline_braces;
mod redundant_parens;
mod scope_resolution;

pub use keyword_operators::KeywordBooleanOperator;
pub use line_length::LineLength;
pub use multiline_braces::MultilineBraceBlock;
pub use redundant_parens::RedundantConditionParens;
pub use scope_resolution::ScopeResolutionMethodCall;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::config::Config;
use crate::engine::NodeContext;
use crate::tree::{Node, NodeKind, Span};

/// Severity levels for findings, ordered so `Error` compares greatest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Unique identifier for a rule, e.g. "keyword-boolean-operator".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RuleId(pub &'static str);

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single proposed text replacement. Byte offsets index the unit source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub start_byte: usize,
    pub end_byte: usize,
    pub replacement: String,
}

impl Edit {
    pub fn new(start_byte: usize, end_byte: usize, replacement: impl Into<String>) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement: replacement.into(),
        }
    }

    pub fn overlaps(&self, other: &Edit) -> bool {
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }
}

/// One rule violation instance. Immutable once collected.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub rule: RuleId,
    pub severity: Severity,
    pub span: Span,
    pub message: String,
    /// Suggested rewrite; empty when the rule offers no autocorrection.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<Edit>,
}

impl Finding {
    pub fn new(rule: RuleId, severity: Severity, span: Span, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity,
            span,
            message: message.into(),
            edits: Vec::new(),
        }
    }

    /// Attach an edit. Edits within one finding must not overlap each other;
    /// that is the rule author's responsibility and is debug-asserted here.
    pub fn with_edit(mut self, edit: Edit) -> Self {
        debug_assert!(
            self.edits.iter().all(|e| !e.overlaps(&edit)),
            "edits within a finding must be non-overlapping"
        );
        self.edits.push(edit);
        self
    }

    pub fn has_fix(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Key used for de-duplicating structurally identical matches.
    pub fn dedup_key(&self) -> (RuleId, Span, &str) {
        (self.rule, self.span, &self.message)
    }
}

/// Free-form per-rule parameters from configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleParams(pub BTreeMap<String, serde_yaml::Value>);

impl RuleParams {
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.0.get(key).and_then(|v| v.as_u64()).map(|v| v as usize)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A named structural pattern over the parsed tree.
///
/// `check` must be pure with respect to the tree: it may read the node, its
/// ancestors, and its siblings through the context, but never mutates
/// anything. Rules describe rewrites as `Edit`s; they never touch the tree.
pub trait Rule: Send + Sync {
    /// Stable identifier, used in configuration and suppression comments.
    fn id(&self) -> RuleId;

    /// One-line description of the convention this rule enforces.
    fn description(&self) -> &'static str;

    fn default_severity(&self) -> Severity;

    /// Node kinds this rule subscribes to. The traversal only consults the
    /// rule for nodes of these kinds.
    fn node_kinds(&self) -> &'static [NodeKind];

    /// Match the rule against one node. Returns zero or more findings.
    fn check(&self, node: &Node, ctx: &NodeContext<'_>, params: &RuleParams) -> Vec<Finding>;
}

/// Errors that make a run untrustworthy: surfaced before any traversal.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("duplicate rule id: {0}")]
    DuplicateRule(String),
    #[error("unknown rule id in configuration: {0}")]
    UnknownRule(String),
}

/// Owns all registered rules, keyed by id.
#[derive(Default)]
pub struct Registry {
    rules: Vec<Box<dyn Rule>>,
    index: HashMap<&'static str, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the built-in style rules.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for rule in builtin_rules() {
            registry
                .register(rule)
                .expect("builtin rule ids are unique");
        }
        registry
    }

    /// Register a rule. Fails if the id is already taken.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), EngineError> {
        let id = rule.id().as_str();
        if self.index.contains_key(id) {
            return Err(EngineError::DuplicateRule(id.to_string()));
        }
        self.index.insert(id, self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve configuration into the effective active rule set.
    ///
    /// Fails fast on unknown rule ids: a typo in configuration means the run
    /// would not check what the operator intended.
    pub fn resolve(&self, config: &Config) -> Result<ResolvedRules<'_>, EngineError> {
        for id in config.rules.keys() {
            if !self.index.contains_key(id.as_str()) {
                return Err(EngineError::UnknownRule(id.clone()));
            }
        }

        let mut active = Vec::new();
        let mut by_kind: HashMap<NodeKind, Vec<usize>> = HashMap::new();

        // Registration order, so dispatch within a node is deterministic.
        for rule in &self.rules {
            let overrides = config.rules.get(rule.id().as_str());
            if let Some(cfg) = overrides {
                if !cfg.is_enabled() {
                    continue;
                }
            }
            let severity = overrides
                .and_then(|c| c.severity)
                .unwrap_or_else(|| rule.default_severity());
            let params = overrides
                .map(|c| c.params.clone())
                .unwrap_or_default();

            let idx = active.len();
            for kind in rule.node_kinds() {
                by_kind.entry(*kind).or_default().push(idx);
            }
            active.push(ActiveRule {
                rule: rule.as_ref(),
                severity,
                params,
            });
        }

        Ok(ResolvedRules { active, by_kind })
    }
}

/// A registered rule annotated with its effective severity and params.
pub struct ActiveRule<'a> {
    pub rule: &'a dyn Rule,
    pub severity: Severity,
    pub params: RuleParams,
}

/// The read-only resolved rule set shared by all workers during a run.
pub struct ResolvedRules<'a> {
    active: Vec<ActiveRule<'a>>,
    by_kind: HashMap<NodeKind, Vec<usize>>,
}

impl<'a> ResolvedRules<'a> {
    /// Indices of active rules subscribed to the given node kind, in
    /// registration order.
    pub fn subscribed(&self, kind: NodeKind) -> &[usize] {
        self.by_kind.get(&kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn get(&self, idx: usize) -> &ActiveRule<'a> {
        &self.active[idx]
    }

    pub fn active(&self) -> &[ActiveRule<'a>] {
        &self.active
    }
}

/// All built-in style rules, in registration order.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ScopeResolutionMethodCall),
        Box::new(RedundantConditionParens),
        Box::new(KeywordBooleanOperator),
        Box::new(MultilineBraceBlock),
        Box::new(LineLength),
    ]
}
