use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Point};

/// Zero-based line and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Position { line: point.row, column: point.column }
    }
}

/// Source range of a node. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }
}

/// One parsed syntax node: a type tag plus where it sits in the source.
///
/// Borrowed from a [`crate::parser::SyntaxTree`], so it cannot outlive the
/// pass that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralNode<'tree> {
    node: Node<'tree>,
}

impl<'tree> StructuralNode<'tree> {
    pub(crate) fn new(node: Node<'tree>) -> Self {
        StructuralNode { node }
    }

    pub fn kind(&self) -> &'static str {
        self.node.kind()
    }

    pub fn span(&self) -> Span {
        Span::new(self.node.start_position().into(), self.node.end_position().into())
    }

    pub fn start_byte(&self) -> usize {
        self.node.start_byte()
    }

    pub fn end_byte(&self) -> usize {
        self.node.end_byte()
    }

    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.node.start_byte()..self.node.end_byte()]
    }

    pub fn field(&self, name: &str) -> Option<StructuralNode<'tree>> {
        self.node.child_by_field_name(name).map(StructuralNode::new)
    }

    pub fn parent(&self) -> Option<StructuralNode<'tree>> {
        self.node.parent().map(StructuralNode::new)
    }

    pub fn named_children(&self) -> Vec<StructuralNode<'tree>> {
        let mut children = Vec::with_capacity(self.node.named_child_count());
        let count = self.node.child_count();
        for i in 0..count {
            if let Some(child) = self.node.child(i) {
                if child.is_named() {
                    children.push(StructuralNode::new(child));
                }
            }
        }
        children
    }

    pub fn raw(&self) -> Node<'tree> {
        self.node
    }
}
