//! End-to-end engine behavior over hand-built units.

use std::time::Duration;

use styleguard::config::{Config, RuleConfig};
use styleguard::engine::{self, resolve_corrections, NodeContext, RunStatus, SkipReason};
use styleguard::rules::{Edit, Finding, Registry, Rule, RuleId, RuleParams, Severity};
use styleguard::tree::{Node, NodeKind, Span, Unit};

fn node(kind: NodeKind, span: Span, children: Vec<Node>) -> Node {
    Node {
        kind,
        span,
        text: None,
        children,
    }
}

fn token(kind: NodeKind, span: Span, text: &str) -> Node {
    Node {
        kind,
        span,
        text: Some(text.to_string()),
        children: Vec::new(),
    }
}

fn sp(start: usize, end: usize, line: usize) -> Span {
    Span::new(start, end, line, line)
}

/// `a and b` as a one-line unit.
fn keyword_unit(path: &str) -> Unit {
    Unit {
        path: path.to_string(),
        source: "a and b".to_string(),
        tree: node(
            NodeKind::Program,
            sp(0, 7, 1),
            vec![node(
                NodeKind::Binary,
                sp(0, 7, 1),
                vec![
                    token(NodeKind::Identifier, sp(0, 1, 1), "a"),
                    token(NodeKind::Operator, sp(2, 5, 1), "and"),
                    token(NodeKind::Identifier, sp(6, 7, 1), "b"),
                ],
            )],
        ),
    }
}

/// `if (x > 10)` with the condition wrapped in a grouping.
fn parenthesized_if_unit() -> Unit {
    //             0         1
    //             01234567890
    let source = "if (x > 10)";
    Unit {
        path: "cond.rb".to_string(),
        source: source.to_string(),
        tree: node(
            NodeKind::Program,
            sp(0, 11, 1),
            vec![node(
                NodeKind::Conditional,
                sp(0, 11, 1),
                vec![
                    token(NodeKind::Operator, sp(0, 2, 1), "if"),
                    node(
                        NodeKind::Grouping,
                        sp(3, 11, 1),
                        vec![
                            token(NodeKind::Punct, sp(3, 4, 1), "("),
                            node(
                                NodeKind::Binary,
                                sp(4, 10, 1),
                                vec![
                                    token(NodeKind::Identifier, sp(4, 5, 1), "x"),
                                    token(NodeKind::Operator, sp(6, 7, 1), ">"),
                                    token(NodeKind::Literal, sp(8, 10, 1), "10"),
                                ],
                            ),
                            token(NodeKind::Punct, sp(10, 11, 1), ")"),
                        ],
                    ),
                ],
            )],
        ),
    }
}

/// A keyword operator plus a multi-line braced block in one unit:
/// ```text
/// a and b {
///   x
/// }
/// ```
fn mixed_unit() -> Unit {
    let source = "a and b {\n  x\n}";
    Unit {
        path: "mixed.rb".to_string(),
        source: source.to_string(),
        tree: node(
            NodeKind::Program,
            Span::new(0, 15, 1, 3),
            vec![
                node(
                    NodeKind::Binary,
                    sp(0, 7, 1),
                    vec![
                        token(NodeKind::Identifier, sp(0, 1, 1), "a"),
                        token(NodeKind::Operator, sp(2, 5, 1), "and"),
                        token(NodeKind::Identifier, sp(6, 7, 1), "b"),
                    ],
                ),
                node(
                    NodeKind::Block,
                    Span::new(8, 15, 1, 3),
                    vec![
                        token(NodeKind::Punct, sp(8, 9, 1), "{"),
                        token(NodeKind::Identifier, Span::new(12, 13, 2, 2), "x"),
                        token(NodeKind::Punct, Span::new(14, 15, 3, 3), "}"),
                    ],
                ),
            ],
        ),
    }
}

#[test]
fn determinism_byte_identical_across_runs() {
    let registry = Registry::builtin();
    let resolved = registry.resolve(&Config::default()).unwrap();
    let unit = mixed_unit();

    let first = serde_json::to_string(&engine::run_unit(&unit, &resolved, None)).unwrap();
    let second = serde_json::to_string(&engine::run_unit(&unit, &resolved, None)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn autocorrect_fixed_point_for_keyword_operator() {
    let registry = Registry::builtin();
    let resolved = registry.resolve(&Config::default()).unwrap();
    let unit = keyword_unit("fp.rb");

    let result = engine::run_unit(&unit, &resolved, None);
    let outcome = resolve_corrections(&unit.source, &result.findings);
    assert_eq!(outcome.corrected, "a && b");

    // Re-parse of the corrected output: the operator is now symbolic.
    let corrected_unit = Unit {
        path: "fp.rb".to_string(),
        source: outcome.corrected.clone(),
        tree: node(
            NodeKind::Program,
            sp(0, 6, 1),
            vec![node(
                NodeKind::Binary,
                sp(0, 6, 1),
                vec![
                    token(NodeKind::Identifier, sp(0, 1, 1), "a"),
                    token(NodeKind::Operator, sp(2, 4, 1), "&&"),
                    token(NodeKind::Identifier, sp(5, 6, 1), "b"),
                ],
            )],
        ),
    };
    let again = engine::run_unit(&corrected_unit, &resolved, None);
    assert!(again
        .findings
        .iter()
        .all(|f| f.rule.as_str() != "keyword-boolean-operator"));
}

#[test]
fn disabling_one_rule_leaves_disjoint_rules_unchanged() {
    let registry = Registry::builtin();
    let unit = mixed_unit();

    let all = registry.resolve(&Config::default()).unwrap();
    let baseline = engine::run_unit(&unit, &all, None);

    let mut config = Config::default();
    config.rules.insert(
        "multiline-brace-block".to_string(),
        RuleConfig {
            enabled: Some(false),
            ..Default::default()
        },
    );
    let without_blocks = registry.resolve(&config).unwrap();
    let reduced = engine::run_unit(&unit, &without_blocks, None);

    let keyword = |r: &styleguard::engine::RunResult| {
        r.findings
            .iter()
            .filter(|f| f.rule.as_str() == "keyword-boolean-operator")
            .cloned()
            .collect::<Vec<_>>()
    };
    let baseline_kw = keyword(&baseline);
    let reduced_kw = keyword(&reduced);
    assert_eq!(
        serde_json::to_string(&baseline_kw).unwrap(),
        serde_json::to_string(&reduced_kw).unwrap()
    );
    assert!(reduced
        .findings
        .iter()
        .all(|f| f.rule.as_str() != "multiline-brace-block"));
}

#[test]
fn trailing_suppression_drops_only_the_named_rule() {
    // Foo::bar(a and b) # styleguard:ignore scope-resolution-method-call
    let source = "Foo::bar(a and b) # styleguard:ignore scope-resolution-method-call";
    let end = source.len();
    let unit = Unit {
        path: "supp.rb".to_string(),
        source: source.to_string(),
        tree: node(
            NodeKind::Program,
            sp(0, end, 1),
            vec![
                node(
                    NodeKind::Call,
                    sp(0, 17, 1),
                    vec![
                        token(NodeKind::Constant, sp(0, 3, 1), "Foo"),
                        token(NodeKind::Operator, sp(3, 5, 1), "::"),
                        token(NodeKind::Identifier, sp(5, 8, 1), "bar"),
                        token(NodeKind::Punct, sp(8, 9, 1), "("),
                        node(
                            NodeKind::Binary,
                            sp(9, 16, 1),
                            vec![
                                token(NodeKind::Identifier, sp(9, 10, 1), "a"),
                                token(NodeKind::Operator, sp(11, 14, 1), "and"),
                                token(NodeKind::Identifier, sp(15, 16, 1), "b"),
                            ],
                        ),
                        token(NodeKind::Punct, sp(16, 17, 1), ")"),
                    ],
                ),
                token(
                    NodeKind::Comment,
                    sp(18, end, 1),
                    "# styleguard:ignore scope-resolution-method-call",
                ),
            ],
        ),
    };

    let registry = Registry::builtin();
    let resolved = registry.resolve(&Config::default()).unwrap();
    let result = engine::run_unit(&unit, &resolved, None);

    assert!(result
        .findings
        .iter()
        .all(|f| f.rule.as_str() != "scope-resolution-method-call"));
    assert_eq!(result.suppressed.len(), 1);
    assert_eq!(
        result.suppressed[0].finding.rule.as_str(),
        "scope-resolution-method-call"
    );
    // The keyword finding on the same line is unaffected.
    assert!(result
        .findings
        .iter()
        .any(|f| f.rule.as_str() == "keyword-boolean-operator"));
}

/// Rewrites the condition body, deliberately overlapping the paren-removal
/// rule's edit range.
struct ConditionSpacing;

impl Rule for ConditionSpacing {
    fn id(&self) -> RuleId {
        RuleId("condition-spacing")
    }
    fn description(&self) -> &'static str {
        "tightens spacing inside conditions"
    }
    fn default_severity(&self) -> Severity {
        Severity::Info
    }
    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Grouping]
    }
    fn check(&self, node: &Node, ctx: &NodeContext<'_>, _: &RuleParams) -> Vec<Finding> {
        let inner = match node.children.iter().find(|c| c.kind == NodeKind::Binary) {
            Some(b) => b,
            None => return Vec::new(),
        };
        let compact: String = inner
            .source_text(ctx.source)
            .chars()
            .filter(|c| *c != ' ')
            .collect();
        vec![Finding::new(
            self.id(),
            self.default_severity(),
            inner.span,
            "condition can be written without spaces",
        )
        .with_edit(Edit::new(
            inner.span.start_byte,
            inner.span.end_byte,
            compact,
        ))]
    }
}

#[test]
fn overlapping_edits_skip_the_later_finding() {
    let mut registry = Registry::builtin();
    registry.register(Box::new(ConditionSpacing)).unwrap();
    let resolved = registry.resolve(&Config::default()).unwrap();
    let unit = parenthesized_if_unit();

    let result = engine::run_unit(&unit, &resolved, None);
    let outcome = resolve_corrections(&unit.source, &result.findings);

    // The paren-removal fix starts earlier in the source, so it wins.
    assert_eq!(outcome.corrected, "if x > 10");
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].rule.as_str(), "condition-spacing");
    assert_eq!(
        outcome.skipped[0].reason,
        SkipReason::Conflict {
            with: RuleId("redundant-condition-parens")
        }
    );
}

#[test]
fn cancelled_unit_reports_no_partial_findings() {
    let registry = Registry::builtin();
    let resolved = registry.resolve(&Config::default()).unwrap();
    let unit = mixed_unit();

    let result = engine::run_unit(&unit, &resolved, Some(Duration::ZERO));
    assert_eq!(result.status, RunStatus::Cancelled);
    assert!(result.findings.is_empty());
}

#[test]
fn unit_files_run_in_parallel_with_per_file_isolation() {
    let temp = tempfile::TempDir::new().unwrap();

    let good = temp.path().join("good.rb.tree.json");
    std::fs::write(
        &good,
        serde_json::to_string(&keyword_unit("good.rb")).unwrap(),
    )
    .unwrap();

    let bad = temp.path().join("bad.rb.tree.json");
    std::fs::write(&bad, "{ not json").unwrap();

    let registry = Registry::builtin();
    let resolved = registry.resolve(&Config::default()).unwrap();
    let results = engine::run_unit_files(&[good, bad.clone()], &resolved, None);

    assert_eq!(results.len(), 2);
    let bad_result = results
        .iter()
        .find(|r| r.path.contains("bad.rb"))
        .unwrap();
    assert_eq!(bad_result.status, RunStatus::ParseUnavailable);

    let good_result = results.iter().find(|r| r.path == "good.rb").unwrap();
    assert_eq!(good_result.status, RunStatus::Finished);
    assert_eq!(good_result.findings.len(), 1);
}

#[test]
fn scope_resolution_example_end_to_end() {
    // SomeClass::some_method with a non-constant member after `::`.
    let source = "SomeClass::some_method";
    let unit = Unit {
        path: "example.rb".to_string(),
        source: source.to_string(),
        tree: node(
            NodeKind::Program,
            sp(0, 22, 1),
            vec![node(
                NodeKind::Call,
                sp(0, 22, 1),
                vec![
                    token(NodeKind::Constant, sp(0, 9, 1), "SomeClass"),
                    token(NodeKind::Operator, sp(9, 11, 1), "::"),
                    token(NodeKind::Identifier, sp(11, 22, 1), "some_method"),
                ],
            )],
        ),
    };

    let registry = Registry::builtin();
    let resolved = registry.resolve(&Config::default()).unwrap();
    let result = engine::run_unit(&unit, &resolved, None);

    let hits: Vec<_> = result
        .findings
        .iter()
        .filter(|f| f.rule.as_str() == "scope-resolution-method-call")
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].span, sp(0, 22, 1));
    assert!(hits[0].message.contains("::"));

    let outcome = resolve_corrections(&unit.source, &result.findings);
    assert_eq!(outcome.corrected, "SomeClass.some_method");
}
