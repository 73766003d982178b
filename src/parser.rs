use std::collections::BTreeSet;
use std::fmt;

use camino::Utf8Path;
use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

use crate::node::StructuralNode;

/// Syntactic type tag of a node, as named by the grammar (`binary_expression`, `number`, ...).
pub type TypeTag = &'static str;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsDialect {
    JavaScript,
    TypeScript,
    Tsx,
}

impl JsDialect {
    /// Pick the grammar from a file extension. Unknown extensions parse as JavaScript.
    pub fn from_path(path: &Utf8Path) -> JsDialect {
        match path.extension() {
            Some("ts" | "mts" | "cts") => JsDialect::TypeScript,
            Some("tsx" | "jsx") => JsDialect::Tsx,
            _ => JsDialect::JavaScript,
        }
    }

    fn language(self) -> tree_sitter::Language {
        match self {
            JsDialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            JsDialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            JsDialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `line` is 1-based.
    #[error("Line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Failed to load grammar: {0}")]
    Grammar(String),

    #[error("Parser produced no tree")]
    NoTree,
}

/// A successfully parsed compilation unit.
pub struct SyntaxTree {
    tree: Tree,
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree").field("root", &self.tree.root_node()).finish()
    }
}

impl SyntaxTree {
    pub fn root(&self) -> StructuralNode<'_> {
        StructuralNode::new(self.tree.root_node())
    }

    /// All named nodes whose type is in `types`, in document (pre-)order.
    pub fn nodes_of_type(&self, types: &BTreeSet<TypeTag>) -> Vec<StructuralNode<'_>> {
        let mut found = Vec::new();
        if types.is_empty() {
            return found;
        }

        let mut cursor = self.tree.walk();
        loop {
            let node = cursor.node();
            if node.is_named() && types.contains(node.kind()) {
                found.push(StructuralNode::new(node));
            }
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return found;
                }
            }
        }
    }
}

/// Parse `source` with the grammar for `dialect`.
///
/// tree-sitter always recovers, so a tree holding any ERROR or MISSING node is
/// reported as a syntax error rather than returned.
pub fn parse(source: &str, dialect: JsDialect) -> Result<SyntaxTree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.language())
        .map_err(|e| ParseError::Grammar(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(describe_error(root, source));
    }
    Ok(SyntaxTree { tree })
}

fn describe_error(root: Node, source: &str) -> ParseError {
    let Some(problem) = first_problem(root) else {
        return ParseError::Syntax { line: 1, message: "Invalid syntax".to_string() };
    };

    if problem.is_missing() {
        let line = problem.start_position().row + 1;
        return ParseError::Syntax { line, message: format!("Missing {}", problem.kind()) };
    }

    match offending_token(root, problem) {
        Some(token) => ParseError::Syntax {
            line: token.start_position().row + 1,
            message: format!("Unexpected token {}", source[token.start_byte()..token.end_byte()].trim()),
        },
        None => ParseError::Syntax {
            line: root.end_position().row + 1,
            message: "Unexpected end of input".to_string(),
        },
    }
}

/// The token the parser choked on.
///
/// An ERROR node holding a named subtree is a prefix the parser accepted before
/// giving up, so the culprit is the first token after it. An ERROR node made of
/// bare tokens only is itself what got skipped.
fn offending_token<'t>(root: Node<'t>, problem: Node<'t>) -> Option<Node<'t>> {
    let mut cursor = problem.walk();
    let skipped_only = !problem.children(&mut cursor).any(|child| child.is_named());
    if skipped_only {
        return leaves(problem).into_iter().next();
    }
    leaves(root)
        .into_iter()
        .find(|leaf| leaf.start_byte() >= problem.end_byte())
}

fn first_problem(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        // Subtrees without errors cannot contain the culprit.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Non-empty tokens under `node`, in source order. Comments are not tokens.
fn leaves(node: Node) -> Vec<Node> {
    let mut found = Vec::new();
    let mut cursor = node.walk();
    loop {
        let current = cursor.node();
        if current.child_count() == 0 {
            if current.end_byte() > current.start_byte() && current.kind() != "comment" {
                found.push(current);
            }
        } else if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.node() == node {
                return found;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return found;
            }
        }
    }
}
