use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;

use crate::error::{MutateError, ReadError, Result};
use crate::log::{ConsoleLogger, Logger};
use crate::mutants::Mutant;
use crate::parser::{self, JsDialect, TypeTag};
use crate::registry::OperatorRegistry;
use crate::source::{FsReader, SourceReader};

/// Finds every place in a set of files where the registry's operators apply.
///
/// Mutants come out in a fixed order: files as given, nodes in document
/// order within a file, operators in registry order within a node.
pub struct Mutator {
    registry: Arc<OperatorRegistry>,
    reader: Arc<dyn SourceReader>,
    logger: Arc<dyn Logger>,
}

impl Mutator {
    pub fn new(registry: Arc<OperatorRegistry>) -> Self {
        Mutator {
            registry,
            reader: Arc::new(FsReader),
            logger: Arc::new(ConsoleLogger),
        }
    }

    pub fn with_reader(mut self, reader: Arc<dyn SourceReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Mutants for every file, in order. Missing files are logged and skipped;
    /// any other failure aborts the whole call.
    pub fn mutate(&self, source_files: &[Utf8PathBuf]) -> Result<Vec<Mutant>> {
        validate(source_files)?;

        let types = self.registry.types_of_interest();
        let mut mutants = Vec::new();
        for file in source_files {
            self.collect(self.scan_file(file, &types)?, &mut mutants);
        }
        Ok(mutants)
    }

    /// Same result and same log output as [`Mutator::mutate`], with files
    /// scanned on the rayon pool. Files after the first failing one are not
    /// scanned.
    pub fn mutate_parallel(&self, source_files: &[Utf8PathBuf]) -> Result<Vec<Mutant>> {
        validate(source_files)?;

        let types = self.registry.types_of_interest();
        let first_failure = AtomicUsize::new(usize::MAX);
        let scans: Vec<Option<Result<Scan>>> = source_files
            .par_iter()
            .enumerate()
            .map(|(index, file)| {
                if index > first_failure.load(Ordering::Relaxed) {
                    return None;
                }
                let scan = self.scan_file(file, &types);
                if scan.is_err() {
                    first_failure.fetch_min(index, Ordering::Relaxed);
                }
                Some(scan)
            })
            .collect();

        // Replayed in input order so notices and the reported error match `mutate`.
        let mut mutants = Vec::new();
        for scan in scans {
            let Some(scan) = scan else {
                break;
            };
            self.collect(scan?, &mut mutants);
        }
        Ok(mutants)
    }

    fn collect(&self, scan: Scan, mutants: &mut Vec<Mutant>) {
        match scan {
            Scan::Missing(path) => self
                .logger
                .info(&format!("Skipping file {} because it does not exist", path)),
            Scan::Found(found) => mutants.extend(found),
        }
    }

    fn scan_file(&self, file: &Utf8Path, types: &BTreeSet<TypeTag>) -> Result<Scan> {
        let source = match self.reader.read_file(file) {
            Ok(source) => source,
            Err(ReadError::NotFound(path)) => return Ok(Scan::Missing(path)),
            Err(ReadError::Io { path, source }) => return Err(MutateError::Io { path, source }),
        };

        let tree = parser::parse(&source, JsDialect::from_path(file)).map_err(|source| {
            MutateError::Parse { path: file.to_path_buf(), source }
        })?;

        let mut mutants = Vec::new();
        for node in tree.nodes_of_type(types) {
            for operator in self.registry.operators() {
                if !operator.can_apply(&node) {
                    continue;
                }
                let found = operator.apply(file, &source, &node, &tree).map_err(|source| {
                    MutateError::Operator {
                        operator: operator.name(),
                        path: file.to_path_buf(),
                        source,
                    }
                })?;
                mutants.extend(found);
            }
        }
        Ok(Scan::Found(mutants))
    }
}

/// Outcome of one file, before anything is logged.
enum Scan {
    Missing(Utf8PathBuf),
    Found(Vec<Mutant>),
}

fn validate(source_files: &[Utf8PathBuf]) -> Result<()> {
    if let Some(index) = source_files.iter().position(|file| file.as_str().is_empty()) {
        return Err(MutateError::InvalidArgument(format!(
            "source file at position {} is an empty path",
            index
        )));
    }
    Ok(())
}
