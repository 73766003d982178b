use std::collections::BTreeSet;

use camino::Utf8Path;
use jsmutate::node::{Position, Span};
use jsmutate::parser::{self, JsDialect, ParseError, TypeTag};

fn types(tags: &[TypeTag]) -> BTreeSet<TypeTag> {
    tags.iter().copied().collect()
}

fn texts(source: &str, tags: &[TypeTag]) -> Vec<String> {
    let tree = parser::parse(source, JsDialect::JavaScript).unwrap();
    tree.nodes_of_type(&types(tags))
        .iter()
        .map(|n| n.text(source).to_string())
        .collect()
}

// --- Dialect detection ---

#[test]
fn dialect_javascript() {
    assert_eq!(JsDialect::from_path(Utf8Path::new("foo.js")), JsDialect::JavaScript);
    assert_eq!(JsDialect::from_path(Utf8Path::new("foo.mjs")), JsDialect::JavaScript);
    assert_eq!(JsDialect::from_path(Utf8Path::new("foo.cjs")), JsDialect::JavaScript);
}

#[test]
fn dialect_typescript() {
    assert_eq!(JsDialect::from_path(Utf8Path::new("foo.ts")), JsDialect::TypeScript);
    assert_eq!(JsDialect::from_path(Utf8Path::new("foo.mts")), JsDialect::TypeScript);
    assert_eq!(JsDialect::from_path(Utf8Path::new("foo.cts")), JsDialect::TypeScript);
}

#[test]
fn dialect_tsx_jsx() {
    assert_eq!(JsDialect::from_path(Utf8Path::new("foo.tsx")), JsDialect::Tsx);
    assert_eq!(JsDialect::from_path(Utf8Path::new("foo.jsx")), JsDialect::Tsx);
}

#[test]
fn dialect_unknown_falls_back_to_javascript() {
    assert_eq!(JsDialect::from_path(Utf8Path::new("foo")), JsDialect::JavaScript);
    assert_eq!(JsDialect::from_path(Utf8Path::new("thefile.txt")), JsDialect::JavaScript);
}

// --- Node queries ---

#[test]
fn nodes_come_back_in_document_order() {
    assert_eq!(texts("let a = 1 + 2;\nlet b = 3;\n", &["number"]), vec!["1", "2", "3"]);
}

#[test]
fn outer_node_precedes_nested_node() {
    let found = texts("x = a + b * c;", &["binary_expression"]);
    assert_eq!(found, vec!["a + b * c", "b * c"]);
}

#[test]
fn several_types_are_interleaved_by_position() {
    let found = texts("if (true) { n = 2; }", &["true", "number"]);
    assert_eq!(found, vec!["true", "2"]);
}

#[test]
fn empty_type_set_finds_nothing() {
    assert!(texts("let a = 1;", &[]).is_empty());
}

#[test]
fn unknown_type_finds_nothing() {
    assert!(texts("let a = 1;", &["no_such_node"]).is_empty());
}

#[test]
fn node_span_is_zero_based_and_end_exclusive() {
    let source = "function f() {}\n";
    let tree = parser::parse(source, JsDialect::JavaScript).unwrap();
    let nodes = tree.nodes_of_type(&types(&["function_declaration"]));
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].kind(), "function_declaration");
    assert_eq!(
        nodes[0].span(),
        Span::new(Position { line: 0, column: 0 }, Position { line: 0, column: 15 })
    );
    assert_eq!(nodes[0].start_byte(), 0);
    assert_eq!(nodes[0].end_byte(), 15);
}

#[test]
fn multi_line_span() {
    let source = "function something () {\n}\n";
    let tree = parser::parse(source, JsDialect::JavaScript).unwrap();
    let nodes = tree.nodes_of_type(&types(&["function_declaration"]));
    assert_eq!(
        nodes[0].span(),
        Span::new(Position { line: 0, column: 0 }, Position { line: 1, column: 1 })
    );
}

#[test]
fn field_and_parent_navigation() {
    let source = "x = a - b;";
    let tree = parser::parse(source, JsDialect::JavaScript).unwrap();
    let nodes = tree.nodes_of_type(&types(&["binary_expression"]));
    let op = nodes[0].field("operator").unwrap();
    assert_eq!(op.kind(), "-");
    assert_eq!(op.parent().unwrap(), nodes[0]);
    assert_eq!(nodes[0].field("left").unwrap().text(source), "a");
    assert_eq!(nodes[0].field("right").unwrap().text(source), "b");
}

// --- Parse failures ---

#[test]
fn valid_source_parses() {
    assert!(parser::parse("function f(){ return 1; }", JsDialect::JavaScript).is_ok());
}

#[test]
fn empty_source_parses() {
    let tree = parser::parse("", JsDialect::JavaScript).unwrap();
    assert_eq!(tree.root().kind(), "program");
}

#[test]
fn missing_parameter_list_is_a_syntax_error() {
    let err = parser::parse("function something {}", JsDialect::JavaScript).unwrap_err();
    match &err {
        ParseError::Syntax { line, .. } => assert_eq!(*line, 1),
        other => panic!("expected a syntax error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "Line 1: Unexpected token {");
}

#[test]
fn stray_closing_brace_is_the_unexpected_token() {
    let err = parser::parse("a = 1;\n}\n", JsDialect::JavaScript).unwrap_err();
    assert_eq!(err.to_string(), "Line 2: Unexpected token }");
}

#[test]
fn syntax_error_reports_its_line() {
    let err = parser::parse("let a = 1;\nlet b = ;\n", JsDialect::JavaScript).unwrap_err();
    assert!(err.to_string().starts_with("Line 2: "), "got: {err}");
}

#[test]
fn typescript_needs_the_typescript_grammar() {
    let source = "let x: number = 1;";
    assert!(parser::parse(source, JsDialect::TypeScript).is_ok());
    assert!(parser::parse(source, JsDialect::JavaScript).is_err());
}

#[test]
fn tsx_parses_jsx_elements() {
    let source = "const el = <div className=\"a\">{x}</div>;";
    assert!(parser::parse(source, JsDialect::Tsx).is_ok());
}
