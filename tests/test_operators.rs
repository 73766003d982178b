use std::collections::BTreeSet;

use camino::Utf8Path;
use jsmutate::Mutant;
use jsmutate::operators::{
    ArithmeticOperator, BlockStatementRemoval, BooleanLiteral, BoundaryCondition,
    LogicalOperator, MutationOperator, NegateComparison, NumericLiteralNegation,
    RemoveConditional, UnaryOperator, UpdateOperator,
};
use jsmutate::parser::{self, JsDialect};
use jsmutate::OperatorRegistry;

fn run(op: &dyn MutationOperator, source: &str) -> Vec<Mutant> {
    let tree = parser::parse(source, JsDialect::JavaScript).unwrap();
    let types: BTreeSet<_> = op.types_of_interest().iter().copied().collect();
    let mut mutants = Vec::new();
    for node in tree.nodes_of_type(&types) {
        if op.can_apply(&node) {
            mutants.extend(op.apply(Utf8Path::new("app.js"), source, &node, &tree).unwrap());
        }
    }
    mutants
}

fn swaps(mutants: &[Mutant]) -> Vec<(&str, &str)> {
    mutants.iter().map(|m| (m.original(), m.replacement())).collect()
}

// --- Arithmetic ---

#[test]
fn arithmetic_plus_to_minus() {
    let mutants = run(&ArithmeticOperator, "x = a + b;");
    assert_eq!(swaps(&mutants), vec![("+", "-")]);
    assert_eq!(mutants[0].operator(), "arithmetic");
}

#[test]
fn arithmetic_covers_each_operator() {
    let mutants = run(&ArithmeticOperator, "x = a - b * c / d % e;");
    let found = swaps(&mutants);
    assert!(found.contains(&("-", "+")));
    assert!(found.contains(&("*", "/")));
    assert!(found.contains(&("/", "*")));
    assert!(found.contains(&("%", "*")));
    assert_eq!(found.len(), 4);
}

#[test]
fn arithmetic_skips_string_concatenation() {
    assert!(run(&ArithmeticOperator, "x = \"hello \" + name;").is_empty());
    assert!(run(&ArithmeticOperator, "x = name + 'suffix';").is_empty());
    assert!(run(&ArithmeticOperator, "x = `a${b}` + c;").is_empty());
}

#[test]
fn arithmetic_ignores_comparisons() {
    assert!(run(&ArithmeticOperator, "x = a < b;").is_empty());
}

#[test]
fn arithmetic_targets_only_the_operator_token() {
    let source = "x = a + b;";
    let mutants = run(&ArithmeticOperator, source);
    assert_eq!(mutants[0].start_byte(), 6);
    assert_eq!(mutants[0].end_byte(), 7);
    assert_eq!(mutants[0].apply(source), "x = a - b;");
}

// --- Comparisons ---

#[test]
fn boundary_flips_strictness() {
    let mutants = run(&BoundaryCondition, "x = a < b && c >= d;");
    assert_eq!(swaps(&mutants), vec![("<", "<="), (">=", ">")]);
}

#[test]
fn boundary_ignores_equality() {
    assert!(run(&BoundaryCondition, "x = a === b;").is_empty());
}

#[test]
fn negate_comparison_relational() {
    assert_eq!(swaps(&run(&NegateComparison, "x = a > 0;")), vec![(">", "<=")]);
    assert_eq!(swaps(&run(&NegateComparison, "x = a <= 0;")), vec![("<=", ">")]);
}

#[test]
fn negate_comparison_equality() {
    assert_eq!(swaps(&run(&NegateComparison, "x = a === 0;")), vec![("===", "!==")]);
    assert_eq!(swaps(&run(&NegateComparison, "x = a !== 0;")), vec![("!==", "===")]);
    assert_eq!(swaps(&run(&NegateComparison, "x = a == 0;")), vec![("==", "!=")]);
    assert_eq!(swaps(&run(&NegateComparison, "x = a != 0;")), vec![("!=", "==")]);
}

// --- Logical ---

#[test]
fn logical_and_or_swap() {
    assert_eq!(swaps(&run(&LogicalOperator, "x = a && b;")), vec![("&&", "||")]);
    assert_eq!(swaps(&run(&LogicalOperator, "x = a || b;")), vec![("||", "&&")]);
}

#[test]
fn logical_nullish_coalescing() {
    assert_eq!(swaps(&run(&LogicalOperator, "x = a ?? b;")), vec![("??", "&&")]);
}

// --- Unary and update ---

#[test]
fn unary_not_is_removed() {
    let mutants = run(&UnaryOperator, "if (!ready) go();");
    assert_eq!(swaps(&mutants), vec![("!ready", "ready")]);
}

#[test]
fn unary_sign_swap() {
    assert_eq!(swaps(&run(&UnaryOperator, "x = -y;")), vec![("-", "+")]);
    assert_eq!(swaps(&run(&UnaryOperator, "x = +y;")), vec![("+", "-")]);
}

#[test]
fn unary_ignores_typeof() {
    assert!(run(&UnaryOperator, "x = typeof y;").is_empty());
}

#[test]
fn update_postfix_and_prefix() {
    assert_eq!(swaps(&run(&UpdateOperator, "i++;")), vec![("++", "--")]);
    assert_eq!(swaps(&run(&UpdateOperator, "--i;")), vec![("--", "++")]);
}

// --- Literals ---

#[test]
fn boolean_literals_flip() {
    let mutants = run(&BooleanLiteral, "x = true; y = false;");
    assert_eq!(swaps(&mutants), vec![("true", "false"), ("false", "true")]);
}

#[test]
fn numeric_literal_is_negated() {
    let source = "function f(){ return 1; }";
    let mutants = run(&NumericLiteralNegation, source);
    assert_eq!(swaps(&mutants), vec![("1", "-1")]);
    assert_eq!(mutants[0].apply(source), "function f(){ return -1; }");
}

#[test]
fn numeric_literal_keeps_its_spelling() {
    assert_eq!(swaps(&run(&NumericLiteralNegation, "x = 0.5;")), vec![("0.5", "-0.5")]);
    assert_eq!(swaps(&run(&NumericLiteralNegation, "x = 0x1F;")), vec![("0x1F", "-0x1F")]);
}

#[test]
fn numeric_literal_already_negative_is_skipped() {
    assert!(run(&NumericLiteralNegation, "x = -1;").is_empty());
}

#[test]
fn numeric_literal_glued_to_a_sign_is_parenthesized() {
    assert_eq!(swaps(&run(&NumericLiteralNegation, "x = y-1;")), vec![("1", "(-1)")]);
    assert_eq!(swaps(&run(&NumericLiteralNegation, "x = y+2;")), vec![("2", "(-2)")]);
    assert_eq!(swaps(&run(&NumericLiteralNegation, "x = y - 1;")), vec![("1", "-1")]);
}

#[test]
fn numeric_literal_as_power_base_is_parenthesized() {
    assert_eq!(swaps(&run(&NumericLiteralNegation, "y = 2 ** x;")), vec![("2", "(-2)")]);
    assert_eq!(swaps(&run(&NumericLiteralNegation, "y = x ** 2;")), vec![("2", "-2")]);
}

#[test]
fn negated_literals_still_parse() {
    for source in ["x = y-1;", "y = 2 ** x;", "f(3, 4);"] {
        for mutant in run(&NumericLiteralNegation, source) {
            let mutated = mutant.apply(source);
            assert!(parser::parse(&mutated, JsDialect::JavaScript).is_ok(), "got: {mutated}");
        }
    }
}

#[test]
fn numeric_object_key_is_skipped() {
    let mutants = run(&NumericLiteralNegation, "const o = { 1: a };");
    assert!(mutants.is_empty());
}

// --- Control flow ---

#[test]
fn remove_conditional_on_if() {
    let mutants = run(&RemoveConditional, "if (a > b) { go(); }");
    assert_eq!(swaps(&mutants), vec![("a > b", "false"), ("a > b", "true")]);
}

#[test]
fn remove_conditional_on_loops() {
    assert_eq!(swaps(&run(&RemoveConditional, "while (busy) { tick(); }")), vec![("busy", "false")]);
    assert_eq!(swaps(&run(&RemoveConditional, "do { tick(); } while (busy);")), vec![("busy", "false")]);
    assert_eq!(
        swaps(&run(&RemoveConditional, "for (let i = 0; i < n; i++) { tick(); }")),
        vec![("i < n", "false")]
    );
}

#[test]
fn remove_conditional_needs_a_condition() {
    assert!(run(&RemoveConditional, "for (;;) { tick(); }").is_empty());
}

#[test]
fn block_remove_empties_blocks() {
    let source = "if (a) { b(); }";
    let mutants = run(&BlockStatementRemoval, source);
    assert_eq!(swaps(&mutants), vec![("{ b(); }", "{}")]);
    assert_eq!(mutants[0].apply(source), "if (a) {}");
}

#[test]
fn block_remove_skips_empty_and_comment_only_blocks() {
    assert!(run(&BlockStatementRemoval, "if (a) {}").is_empty());
    assert!(run(&BlockStatementRemoval, "if (a) { /* nothing */ }").is_empty());
}

// --- Registry ---

#[test]
fn standard_registry_order() {
    let registry = OperatorRegistry::standard();
    assert_eq!(
        registry.names(),
        vec![
            "arithmetic",
            "boundary",
            "negate_cmp",
            "logic_flip",
            "unary",
            "update",
            "bool_flip",
            "numeric_negation",
            "remove_conditional",
            "block_remove",
        ]
    );
}

#[test]
fn types_of_interest_are_deduplicated() {
    let registry = OperatorRegistry::standard();
    let types = registry.types_of_interest();
    assert!(types.contains("binary_expression"));
    assert!(types.contains("number"));
    assert!(types.contains("statement_block"));
    let declared: usize = registry.operators().iter().map(|op| op.types_of_interest().len()).sum();
    assert!(types.len() < declared, "binary_expression is shared by four operators");
}

#[test]
fn select_keeps_standard_order() {
    let registry = OperatorRegistry::select(&["block_remove", "arithmetic"]).unwrap();
    assert_eq!(registry.names(), vec!["arithmetic", "block_remove"]);
}

#[test]
fn select_rejects_unknown_names() {
    let err = OperatorRegistry::select(&["arithmetic", "nope"]).err();
    assert_eq!(err.as_deref(), Some("nope"));
}

#[test]
fn empty_registry() {
    let registry = OperatorRegistry::new(vec![]);
    assert!(registry.is_empty());
    assert!(registry.types_of_interest().is_empty());
}

#[test]
fn operators_ignore_foreign_node_kinds() {
    let source = "function f(a) {\n  if (a > 1 && !done) { y = -x + 2 ** a; i++; }\n  while (flag === true) { a--; }\n}\n";
    let tree = parser::parse(source, JsDialect::JavaScript).unwrap();
    let registry = OperatorRegistry::standard();
    let all_types = registry.types_of_interest();
    let nodes = tree.nodes_of_type(&all_types);

    for op in registry.operators() {
        for node in &nodes {
            if op.types_of_interest().contains(&node.kind()) {
                continue;
            }
            assert!(!op.can_apply(node), "{} accepted a {}", op.name(), node.kind());
        }
    }
}

#[test]
fn sign_is_not_claimed_by_binary_operators() {
    let source = "y = -x;";
    let tree = parser::parse(source, JsDialect::JavaScript).unwrap();
    let registry = OperatorRegistry::select(&["arithmetic", "unary", "numeric_negation"]).unwrap();
    let mut mutants = Vec::new();
    for node in tree.nodes_of_type(&registry.types_of_interest()) {
        for op in registry.operators() {
            if op.can_apply(&node) {
                mutants.extend(op.apply(Utf8Path::new("app.js"), source, &node, &tree).unwrap());
            }
        }
    }
    let named: Vec<_> = mutants.iter().map(|m| (m.operator(), m.original(), m.replacement())).collect();
    assert_eq!(named, vec![("unary", "-", "+")]);
}
