//! Statement coverage instrumentation.
//!
//! A [`CoverageInstrumenter`] is a two-phase stage bound to one file: it
//! swallows source text until [`CoverageInstrumenter::finish`] is called, then
//! either writes the instrumented program or, if the text cannot be parsed,
//! the original bytes untouched. Nothing reaches the sink before the end of
//! input, so dropping an unfinished stage leaves no trace.
//!
//! Instrumented code bumps counters on a global object named by the coverage
//! variable: `<var>.s['<id>']` for statements and `<var>.f['<id>']` for
//! function declarations. The host test runner creates that object before
//! running the code and reads it back afterwards; ids line up with the
//! [`StatementMap`].

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::log::{ConsoleLogger, Logger};
use crate::node::{Span, StructuralNode};
use crate::parser::{self, JsDialect, ParseError};

/// Location of every instrumented statement, keyed by dense id from 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementMap(BTreeMap<u32, Span>);

impl StatementMap {
    pub fn get(&self, id: u32) -> Option<&Span> {
        self.0.get(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Span)> {
        self.0.iter().map(|(id, span)| (*id, span))
    }

    fn push(&mut self, span: Span) -> u32 {
        let id = self.0.len() as u32 + 1;
        self.0.insert(id, span);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Accumulating,
    Instrumenting,
    PassThrough,
    Done,
}

#[derive(Debug, Error)]
enum InstrumentError {
    #[error("Error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Instrumented output no longer parses: {0}")]
    Rewrite(ParseError),
}

pub struct CoverageInstrumenter<W: Write> {
    file_name: String,
    coverage_variable: String,
    dialect: JsDialect,
    buffer: Vec<u8>,
    state: StageState,
    statement_map: StatementMap,
    sink: W,
    logger: Arc<dyn Logger>,
}

impl<W: Write> CoverageInstrumenter<W> {
    pub fn new(file_name: impl Into<String>, coverage_variable: impl Into<String>, sink: W) -> Self {
        let file_name = file_name.into();
        let dialect = JsDialect::from_path(Utf8Path::new(&file_name));
        CoverageInstrumenter {
            file_name,
            coverage_variable: coverage_variable.into(),
            dialect,
            buffer: Vec::new(),
            state: StageState::Accumulating,
            statement_map: StatementMap::default(),
            sink,
            logger: Arc::new(ConsoleLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    /// Only available once all input has been consumed.
    pub fn statement_map(&self) -> Option<&StatementMap> {
        match self.state {
            StageState::Done => Some(&self.statement_map),
            _ => None,
        }
    }

    /// Signal end of input: instrument (or pass through) and write everything to the sink.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.state != StageState::Accumulating {
            return Ok(());
        }

        let buffer = std::mem::take(&mut self.buffer);
        let output = match self.rewrite(&buffer) {
            Ok((code, statement_map)) => {
                self.state = StageState::Instrumenting;
                self.statement_map = statement_map;
                code.into_bytes()
            }
            Err(e) => {
                self.state = StageState::PassThrough;
                self.logger.error(&format!(
                    "Error while instrumenting file \"{}\", error was: {}",
                    self.file_name, e
                ));
                buffer
            }
        };

        let written = self.sink.write_all(&output).and_then(|_| self.sink.flush());
        self.state = StageState::Done;
        written
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn rewrite(&self, buffer: &[u8]) -> Result<(String, StatementMap), InstrumentError> {
        let source = std::str::from_utf8(buffer)?;
        let tree = parser::parse(source, self.dialect)?;

        let mut plan = Plan::new(&self.coverage_variable);
        plan.visit(tree.root());
        let code = plan.render(source);

        parser::parse(&code, self.dialect).map_err(InstrumentError::Rewrite)?;
        Ok((code, plan.statement_map))
    }
}

impl<W: Write> Write for CoverageInstrumenter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.state {
            StageState::Accumulating => {
                self.buffer.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(io::Error::other(format!(
                "instrumenter for \"{}\" no longer accepts input",
                self.file_name
            ))),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrumented {
    pub code: String,
    pub statement_map: StatementMap,
}

/// Run a whole file through a fresh [`CoverageInstrumenter`].
pub fn instrument(
    file_name: &str,
    coverage_variable: &str,
    source: &str,
    logger: Arc<dyn Logger>,
) -> io::Result<Instrumented> {
    let mut stage = CoverageInstrumenter::new(file_name, coverage_variable, Vec::new())
        .with_logger(logger);
    stage.write_all(source.as_bytes())?;
    stage.finish()?;

    let statement_map = stage.statement_map().cloned().unwrap_or_default();
    let code = String::from_utf8(stage.into_inner())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Instrumented { code, statement_map })
}

// --- Rewriting ---

const FUNCTION_DECLARATIONS: &[&str] = &["function_declaration", "generator_function_declaration"];

const STATEMENTS: &[&str] = &[
    "expression_statement",
    "variable_declaration",
    "lexical_declaration",
    "return_statement",
    "if_statement",
    "for_statement",
    "for_in_statement",
    "while_statement",
    "do_statement",
    "try_statement",
    "throw_statement",
    "switch_statement",
    "break_statement",
    "continue_statement",
    "debugger_statement",
    "labeled_statement",
    "with_statement",
    "class_declaration",
    "import_statement",
    "export_statement",
];

const STATEMENT_LISTS: &[&str] = &[
    "program",
    "statement_block",
    "switch_case",
    "switch_default",
];

enum Placement {
    /// Counter goes right after the opening brace of the function body.
    FunctionBody,
    /// Counter goes in front of the statement.
    Prefix,
    /// Statement sits alone in a control-flow slot and gets braces around it.
    Wrap,
    Skip,
}

struct Insertion {
    offset: usize,
    closing: bool,
    text: String,
}

struct Plan<'v> {
    coverage_variable: &'v str,
    statement_map: StatementMap,
    insertions: Vec<Insertion>,
}

impl<'v> Plan<'v> {
    fn new(coverage_variable: &'v str) -> Self {
        Plan { coverage_variable, statement_map: StatementMap::default(), insertions: Vec::new() }
    }

    fn visit(&mut self, node: StructuralNode<'_>) {
        match placement(&node) {
            Placement::FunctionBody => {
                if let Some(body) = node.field("body") {
                    let id = self.statement_map.push(node.span());
                    self.open(body.start_byte() + 1, self.counter('f', id));
                }
            }
            Placement::Prefix => {
                let id = self.statement_map.push(node.span());
                self.open(node.start_byte(), self.counter('s', id));
            }
            Placement::Wrap => {
                let id = self.statement_map.push(node.span());
                self.open(node.start_byte(), format!("{{{}", self.counter('s', id)));
                self.insertions.push(Insertion {
                    offset: node.end_byte(),
                    closing: true,
                    text: "}".to_string(),
                });
            }
            Placement::Skip => {}
        }

        for child in node.named_children() {
            self.visit(child);
        }
    }

    fn counter(&self, map: char, id: u32) -> String {
        format!("{}.{}['{}']++;", self.coverage_variable, map, id)
    }

    fn open(&mut self, offset: usize, text: String) {
        self.insertions.push(Insertion { offset, closing: false, text });
    }

    fn render(&mut self, source: &str) -> String {
        // Closing braces before anything opened at the same offset; otherwise discovery order.
        self.insertions.sort_by_key(|ins| (ins.offset, !ins.closing));

        let extra: usize = self.insertions.iter().map(|ins| ins.text.len()).sum();
        let mut out = String::with_capacity(source.len() + extra);
        let mut cursor = 0;
        for ins in &self.insertions {
            out.push_str(&source[cursor..ins.offset]);
            out.push_str(&ins.text);
            cursor = ins.offset;
        }
        out.push_str(&source[cursor..]);
        out
    }
}

fn placement(node: &StructuralNode<'_>) -> Placement {
    let kind = node.kind();
    if FUNCTION_DECLARATIONS.contains(&kind) {
        return Placement::FunctionBody;
    }
    if !STATEMENTS.contains(&kind) || is_directive(node) {
        return Placement::Skip;
    }

    let Some(parent) = node.parent() else {
        return Placement::Skip;
    };
    if STATEMENT_LISTS.contains(&parent.kind()) {
        Placement::Prefix
    } else if occupies_body_slot(&parent, node) {
        Placement::Wrap
    } else {
        Placement::Skip
    }
}

fn occupies_body_slot(parent: &StructuralNode<'_>, node: &StructuralNode<'_>) -> bool {
    match parent.kind() {
        "if_statement" => parent.field("consequence") == Some(*node),
        "else_clause" => true,
        "for_statement" | "for_in_statement" | "while_statement" | "do_statement"
        | "with_statement" => parent.field("body") == Some(*node),
        _ => false,
    }
}

/// Directive prologue entries such as `'use strict'`: string-only statements
/// at the head of a program or function body.
fn is_directive(node: &StructuralNode<'_>) -> bool {
    if !is_string_statement(node) {
        return false;
    }
    let Some(parent) = node.parent() else {
        return false;
    };
    let prologue_owner = match parent.kind() {
        "program" => true,
        "statement_block" => parent
            .parent()
            .is_some_and(|owner| owner.field("body") == Some(parent) && is_function_like(&owner)),
        _ => false,
    };
    if !prologue_owner {
        return false;
    }
    parent
        .named_children()
        .into_iter()
        .filter(|sibling| sibling.kind() != "comment" && sibling.kind() != "hash_bang_line")
        .take_while(is_string_statement)
        .any(|sibling| sibling == *node)
}

fn is_string_statement(node: &StructuralNode<'_>) -> bool {
    if node.kind() != "expression_statement" {
        return false;
    }
    let children = node.named_children();
    children.len() == 1 && children[0].kind() == "string"
}

fn is_function_like(node: &StructuralNode<'_>) -> bool {
    matches!(
        node.kind(),
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "generator_function"
            | "arrow_function"
            | "method_definition"
    )
}
