use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use crate::node::{Span, StructuralNode};

/// One candidate defect: where it is, which operator made it, and the text swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutant {
    source_file: Utf8PathBuf,
    span: Span,
    start_byte: usize,
    end_byte: usize,
    operator: String,
    original: String,
    replacement: String,
}

impl Mutant {
    /// Replace the text of `node` in `source` with `replacement`.
    pub fn from_node(
        source_file: &Utf8Path,
        operator: &str,
        source: &str,
        node: &StructuralNode<'_>,
        replacement: impl Into<String>,
    ) -> Mutant {
        Mutant {
            source_file: source_file.to_path_buf(),
            span: node.span(),
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            operator: operator.to_string(),
            original: node.text(source).to_string(),
            replacement: replacement.into(),
        }
    }

    pub fn source_file(&self) -> &Utf8Path {
        &self.source_file
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn start_byte(&self) -> usize {
        self.start_byte
    }

    pub fn end_byte(&self) -> usize {
        self.end_byte
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// The whole file with this mutant applied.
    pub fn apply(&self, source: &str) -> String {
        let mut result = String::with_capacity(source.len() + self.replacement.len());
        result.push_str(&source[..self.start_byte]);
        result.push_str(&self.replacement);
        result.push_str(&source[self.end_byte..]);
        result
    }

    /// Changed lines only, prefixed `- ` / `+ `.
    pub fn diff(&self, source: &str) -> String {
        let mutated = self.apply(source);
        let diff = TextDiff::from_lines(source, &mutated);
        let mut output = String::new();
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Delete => output.push_str(&format!("- {}", change)),
                ChangeTag::Insert => output.push_str(&format!("+ {}", change)),
                ChangeTag::Equal => {}
            }
        }
        output
    }
}
