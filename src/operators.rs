//! Mutation operators for JavaScript / TypeScript.
//!
//! Each operator is one defect category. It names the node types it wants to
//! see, decides per node whether it has something to say, and turns the node
//! into zero or more [`Mutant`]s.

use camino::Utf8Path;
use thiserror::Error;

use crate::mutants::Mutant;
use crate::node::StructuralNode;
use crate::parser::{SyntaxTree, TypeTag};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct OperatorError(pub String);

pub trait MutationOperator: Send + Sync {
    /// Stable identifier recorded on every mutant this operator emits.
    fn name(&self) -> &'static str;

    fn types_of_interest(&self) -> &'static [TypeTag];

    fn can_apply(&self, node: &StructuralNode<'_>) -> bool;

    fn apply(
        &self,
        file: &Utf8Path,
        source: &str,
        node: &StructuralNode<'_>,
        tree: &SyntaxTree,
    ) -> Result<Vec<Mutant>, OperatorError>;
}

/// Whether `node` is one of the kinds `operator` asked for. The engine hands
/// every operator the union of all registered kinds.
fn wants(operator: &dyn MutationOperator, node: &StructuralNode<'_>) -> bool {
    operator.types_of_interest().contains(&node.kind())
}

fn operator_token<'t>(node: &StructuralNode<'t>) -> Option<StructuralNode<'t>> {
    node.field("operator")
}

fn operator_kind(node: &StructuralNode<'_>) -> Option<&'static str> {
    operator_token(node).map(|op| op.kind())
}

/// Replace the operator token of `node` using `table`.
fn swap_operator(
    name: &str,
    file: &Utf8Path,
    source: &str,
    node: &StructuralNode<'_>,
    table: fn(&str) -> Option<&'static str>,
) -> Result<Vec<Mutant>, OperatorError> {
    let token = operator_token(node)
        .ok_or_else(|| OperatorError(format!("{} has no operator token", node.kind())))?;
    let replacement = table(token.kind()).ok_or_else(|| {
        OperatorError(format!("no replacement for operator '{}'", token.kind()))
    })?;
    Ok(vec![Mutant::from_node(file, name, source, &token, replacement)])
}

fn is_string_like(node: Option<StructuralNode<'_>>) -> bool {
    matches!(node.map(|n| n.kind()), Some("string" | "template_string"))
}

// --- Binary operators ---

fn arithmetic_replacement(op: &str) -> Option<&'static str> {
    match op {
        "+" => Some("-"),
        "-" => Some("+"),
        "*" => Some("/"),
        "/" => Some("*"),
        "%" => Some("*"),
        _ => None,
    }
}

/// `a + b` → `a - b` and friends. String concatenation is left alone.
pub struct ArithmeticOperator;

impl MutationOperator for ArithmeticOperator {
    fn name(&self) -> &'static str {
        "arithmetic"
    }

    fn types_of_interest(&self) -> &'static [TypeTag] {
        &["binary_expression"]
    }

    fn can_apply(&self, node: &StructuralNode<'_>) -> bool {
        if !wants(self, node) {
            return false;
        }
        match operator_kind(node) {
            Some("+") => !is_string_like(node.field("left")) && !is_string_like(node.field("right")),
            Some(op) => arithmetic_replacement(op).is_some(),
            None => false,
        }
    }

    fn apply(
        &self,
        file: &Utf8Path,
        source: &str,
        node: &StructuralNode<'_>,
        _tree: &SyntaxTree,
    ) -> Result<Vec<Mutant>, OperatorError> {
        swap_operator(self.name(), file, source, node, arithmetic_replacement)
    }
}

fn boundary_replacement(op: &str) -> Option<&'static str> {
    match op {
        "<" => Some("<="),
        "<=" => Some("<"),
        ">" => Some(">="),
        ">=" => Some(">"),
        _ => None,
    }
}

/// Off-by-one on relational operators: `<` ↔ `<=`, `>` ↔ `>=`.
pub struct BoundaryCondition;

impl MutationOperator for BoundaryCondition {
    fn name(&self) -> &'static str {
        "boundary"
    }

    fn types_of_interest(&self) -> &'static [TypeTag] {
        &["binary_expression"]
    }

    fn can_apply(&self, node: &StructuralNode<'_>) -> bool {
        wants(self, node) && operator_kind(node).and_then(boundary_replacement).is_some()
    }

    fn apply(
        &self,
        file: &Utf8Path,
        source: &str,
        node: &StructuralNode<'_>,
        _tree: &SyntaxTree,
    ) -> Result<Vec<Mutant>, OperatorError> {
        swap_operator(self.name(), file, source, node, boundary_replacement)
    }
}

fn negated_comparison(op: &str) -> Option<&'static str> {
    match op {
        "<" => Some(">="),
        "<=" => Some(">"),
        ">" => Some("<="),
        ">=" => Some("<"),
        "==" => Some("!="),
        "!=" => Some("=="),
        "===" => Some("!=="),
        "!==" => Some("==="),
        _ => None,
    }
}

pub struct NegateComparison;

impl MutationOperator for NegateComparison {
    fn name(&self) -> &'static str {
        "negate_cmp"
    }

    fn types_of_interest(&self) -> &'static [TypeTag] {
        &["binary_expression"]
    }

    fn can_apply(&self, node: &StructuralNode<'_>) -> bool {
        wants(self, node) && operator_kind(node).and_then(negated_comparison).is_some()
    }

    fn apply(
        &self,
        file: &Utf8Path,
        source: &str,
        node: &StructuralNode<'_>,
        _tree: &SyntaxTree,
    ) -> Result<Vec<Mutant>, OperatorError> {
        swap_operator(self.name(), file, source, node, negated_comparison)
    }
}

fn logical_replacement(op: &str) -> Option<&'static str> {
    match op {
        "&&" => Some("||"),
        "||" => Some("&&"),
        "??" => Some("&&"),
        _ => None,
    }
}

pub struct LogicalOperator;

impl MutationOperator for LogicalOperator {
    fn name(&self) -> &'static str {
        "logic_flip"
    }

    fn types_of_interest(&self) -> &'static [TypeTag] {
        &["binary_expression"]
    }

    fn can_apply(&self, node: &StructuralNode<'_>) -> bool {
        wants(self, node) && operator_kind(node).and_then(logical_replacement).is_some()
    }

    fn apply(
        &self,
        file: &Utf8Path,
        source: &str,
        node: &StructuralNode<'_>,
        _tree: &SyntaxTree,
    ) -> Result<Vec<Mutant>, OperatorError> {
        swap_operator(self.name(), file, source, node, logical_replacement)
    }
}

// --- Unary and update operators ---

/// `-x` ↔ `+x`, and `!x` → `x`.
pub struct UnaryOperator;

impl MutationOperator for UnaryOperator {
    fn name(&self) -> &'static str {
        "unary"
    }

    fn types_of_interest(&self) -> &'static [TypeTag] {
        &["unary_expression"]
    }

    fn can_apply(&self, node: &StructuralNode<'_>) -> bool {
        wants(self, node)
            && matches!(operator_kind(node), Some("-" | "+" | "!"))
            && node.field("argument").is_some()
    }

    fn apply(
        &self,
        file: &Utf8Path,
        source: &str,
        node: &StructuralNode<'_>,
        _tree: &SyntaxTree,
    ) -> Result<Vec<Mutant>, OperatorError> {
        match operator_kind(node) {
            Some("!") => {
                let argument = node
                    .field("argument")
                    .ok_or_else(|| OperatorError("negation without an argument".to_string()))?;
                Ok(vec![Mutant::from_node(file, self.name(), source, node, argument.text(source))])
            }
            _ => swap_operator(self.name(), file, source, node, |op| match op {
                "-" => Some("+"),
                "+" => Some("-"),
                _ => None,
            }),
        }
    }
}

/// `i++` ↔ `i--`, prefix or postfix.
pub struct UpdateOperator;

impl MutationOperator for UpdateOperator {
    fn name(&self) -> &'static str {
        "update"
    }

    fn types_of_interest(&self) -> &'static [TypeTag] {
        &["update_expression"]
    }

    fn can_apply(&self, node: &StructuralNode<'_>) -> bool {
        wants(self, node) && matches!(operator_kind(node), Some("++" | "--"))
    }

    fn apply(
        &self,
        file: &Utf8Path,
        source: &str,
        node: &StructuralNode<'_>,
        _tree: &SyntaxTree,
    ) -> Result<Vec<Mutant>, OperatorError> {
        swap_operator(self.name(), file, source, node, |op| match op {
            "++" => Some("--"),
            "--" => Some("++"),
            _ => None,
        })
    }
}

// --- Literals ---

pub struct BooleanLiteral;

impl MutationOperator for BooleanLiteral {
    fn name(&self) -> &'static str {
        "bool_flip"
    }

    fn types_of_interest(&self) -> &'static [TypeTag] {
        &["true", "false"]
    }

    fn can_apply(&self, node: &StructuralNode<'_>) -> bool {
        wants(self, node)
    }

    fn apply(
        &self,
        file: &Utf8Path,
        source: &str,
        node: &StructuralNode<'_>,
        _tree: &SyntaxTree,
    ) -> Result<Vec<Mutant>, OperatorError> {
        let replacement = match node.kind() {
            "true" => "false",
            "false" => "true",
            other => return Err(OperatorError(format!("'{}' is not a boolean literal", other))),
        };
        Ok(vec![Mutant::from_node(file, self.name(), source, node, replacement)])
    }
}

/// `1` → `-1`.
pub struct NumericLiteralNegation;

impl MutationOperator for NumericLiteralNegation {
    fn name(&self) -> &'static str {
        "numeric_negation"
    }

    fn types_of_interest(&self) -> &'static [TypeTag] {
        &["number"]
    }

    fn can_apply(&self, node: &StructuralNode<'_>) -> bool {
        if !wants(self, node) {
            return false;
        }
        let Some(parent) = node.parent() else {
            return true;
        };
        // Object keys and method names cannot carry a sign.
        if parent.field("key").is_some_and(|key| key == *node)
            || parent.field("name").is_some_and(|name| name == *node)
        {
            return false;
        }
        !(parent.kind() == "unary_expression" && matches!(operator_kind(&parent), Some("-" | "+")))
    }

    fn apply(
        &self,
        file: &Utf8Path,
        source: &str,
        node: &StructuralNode<'_>,
        _tree: &SyntaxTree,
    ) -> Result<Vec<Mutant>, OperatorError> {
        let negated = format!("-{}", node.text(source));
        let replacement = if needs_parentheses(node) { format!("({})", negated) } else { negated };
        Ok(vec![Mutant::from_node(file, self.name(), source, node, replacement)])
    }
}

/// A bare `-N` is invalid as the base of `**`, and glued to a preceding sign
/// it turns `x-1` into `x--1`.
fn needs_parentheses(node: &StructuralNode<'_>) -> bool {
    let base_of_power = node.parent().is_some_and(|parent| {
        parent.kind() == "binary_expression"
            && operator_kind(&parent) == Some("**")
            && parent.field("left") == Some(*node)
    });
    let glued_to_sign = node
        .raw()
        .prev_sibling()
        .is_some_and(|prev| matches!(prev.kind(), "-" | "+") && prev.end_byte() == node.start_byte());
    base_of_power || glued_to_sign
}

// --- Control flow ---

/// The expression inside a loop or `if` condition, without its parentheses.
fn condition_expression<'t>(node: &StructuralNode<'t>) -> Option<StructuralNode<'t>> {
    let condition = node.field("condition")?;
    match condition.kind() {
        "parenthesized_expression" | "expression_statement" => condition
            .named_children()
            .into_iter()
            .find(|child| child.kind() != "comment"),
        "empty_statement" | ";" => None,
        _ => Some(condition),
    }
}

/// Force a condition: `if` gets both `false` and `true`, loops get `false`.
pub struct RemoveConditional;

impl MutationOperator for RemoveConditional {
    fn name(&self) -> &'static str {
        "remove_conditional"
    }

    fn types_of_interest(&self) -> &'static [TypeTag] {
        &["if_statement", "while_statement", "do_statement", "for_statement"]
    }

    fn can_apply(&self, node: &StructuralNode<'_>) -> bool {
        wants(self, node) && condition_expression(node).is_some()
    }

    fn apply(
        &self,
        file: &Utf8Path,
        source: &str,
        node: &StructuralNode<'_>,
        _tree: &SyntaxTree,
    ) -> Result<Vec<Mutant>, OperatorError> {
        let condition = condition_expression(node)
            .ok_or_else(|| OperatorError(format!("{} has no condition", node.kind())))?;
        let mut mutants = vec![Mutant::from_node(file, self.name(), source, &condition, "false")];
        if node.kind() == "if_statement" {
            mutants.push(Mutant::from_node(file, self.name(), source, &condition, "true"));
        }
        Ok(mutants)
    }
}

/// Empty out a non-empty block.
pub struct BlockStatementRemoval;

impl MutationOperator for BlockStatementRemoval {
    fn name(&self) -> &'static str {
        "block_remove"
    }

    fn types_of_interest(&self) -> &'static [TypeTag] {
        &["statement_block"]
    }

    fn can_apply(&self, node: &StructuralNode<'_>) -> bool {
        wants(self, node) && node.named_children().iter().any(|child| child.kind() != "comment")
    }

    fn apply(
        &self,
        file: &Utf8Path,
        source: &str,
        node: &StructuralNode<'_>,
        _tree: &SyntaxTree,
    ) -> Result<Vec<Mutant>, OperatorError> {
        Ok(vec![Mutant::from_node(file, self.name(), source, node, "{}")])
    }
}
