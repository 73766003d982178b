use jsmutate::coverage::CoverageInstrumenter;
use jsmutate::error::{MutateError, ReadError};
use jsmutate::mutator::Mutator;
use jsmutate::output;
use jsmutate::registry::OperatorRegistry;
use jsmutate::source::{FsReader, SourceReader};

use std::collections::HashMap;
use std::io::Write;
use std::process;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jsmutate", version, about = "Mutant generation and coverage instrumentation for JavaScript")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the mutants the operators find in source files
    Mutate {
        /// Source files, mutated in the order given
        files: Vec<Utf8PathBuf>,
        /// Only use these operators (repeatable, default: all)
        #[arg(short, long = "operator")]
        operators: Vec<String>,
        /// Process files on a thread pool
        #[arg(long)]
        parallel: bool,
        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,
        /// Show the changed lines for each mutant
        #[arg(long)]
        diff: bool,
    },
    /// Add statement coverage counters to a source file
    Instrument {
        /// Source file to instrument
        file: Utf8PathBuf,
        /// Name of the global coverage object the counters update
        #[arg(long, default_value = "__coverage__", env = "JSMUTATE_COVERAGE_VARIABLE")]
        coverage_variable: String,
        /// Write instrumented code here instead of stdout
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
        /// Write the statement map as JSON to this path
        #[arg(long)]
        statement_map: Option<Utf8PathBuf>,
    },
    /// List available mutation operators
    Operators,
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Mutate { files, operators, parallel, json, diff } => {
            cmd_mutate(files, operators, parallel, json, diff)
        }
        Commands::Instrument { file, coverage_variable, output, statement_map } => {
            cmd_instrument(file, coverage_variable, output, statement_map)
        }
        Commands::Operators => {
            output::print_operators(&OperatorRegistry::standard().names());
            0
        }
    };

    process::exit(exit_code);
}

fn cmd_mutate(
    files: Vec<Utf8PathBuf>,
    operators: Vec<String>,
    parallel: bool,
    json_mode: bool,
    show_diff: bool,
) -> i32 {
    let registry = if operators.is_empty() {
        OperatorRegistry::standard()
    } else {
        match OperatorRegistry::select(&operators) {
            Ok(r) => r,
            Err(unknown) => {
                output::print_error(&format!(
                    "Unknown operator '{}'. Available: {}",
                    unknown,
                    OperatorRegistry::standard().names().join(", ")
                ));
                return 2;
            }
        }
    };

    let mutator = Mutator::new(Arc::new(registry));
    let result = if parallel {
        mutator.mutate_parallel(&files)
    } else {
        mutator.mutate(&files)
    };

    let mutants = match result {
        Ok(m) => m,
        Err(e @ MutateError::InvalidArgument(_)) => {
            output::print_error(&e.to_string());
            return 2;
        }
        Err(e) => {
            output::print_error(&e.to_string());
            return 3;
        }
    };

    if json_mode {
        return match serde_json::to_string(&mutants) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                output::print_error(&format!("Failed to serialize mutants: {}", e));
                3
            }
        };
    }

    output::print_mutant_summary(&mutants, files.len());
    let mut sources: HashMap<Utf8PathBuf, Option<String>> = HashMap::new();
    for (i, mutant) in mutants.iter().enumerate() {
        let diff = if show_diff {
            sources
                .entry(mutant.source_file().to_path_buf())
                .or_insert_with(|| FsReader.read_file(mutant.source_file()).ok())
                .as_deref()
                .map(|source| mutant.diff(source))
        } else {
            None
        };
        output::print_mutant(i, mutant, diff.as_deref());
    }
    0
}

fn cmd_instrument(
    file: Utf8PathBuf,
    coverage_variable: String,
    output_path: Option<Utf8PathBuf>,
    statement_map_path: Option<Utf8PathBuf>,
) -> i32 {
    let source = match FsReader.read_file(&file) {
        Ok(s) => s,
        Err(e @ ReadError::NotFound(_)) => {
            output::print_error(&format!("{}. Check the path and try again.", e));
            return 2;
        }
        Err(e) => {
            output::print_error(&e.to_string());
            return 3;
        }
    };

    let sink: Box<dyn Write> = match &output_path {
        Some(path) => match std::fs::File::create(path) {
            Ok(f) => Box::new(f),
            Err(e) => {
                output::print_error(&format!("Failed to create {}: {}", path, e));
                return 3;
            }
        },
        None => Box::new(std::io::stdout().lock()),
    };

    let mut stage = CoverageInstrumenter::new(file.as_str(), coverage_variable, sink);
    if let Err(e) = stage.write_all(source.as_bytes()).and_then(|_| stage.finish()) {
        output::print_error(&format!("Failed to write instrumented code: {}", e));
        return 3;
    }

    let statement_map = stage.statement_map().cloned().unwrap_or_default();
    match statement_map_path {
        Some(path) => {
            let written = serde_json::to_string_pretty(&statement_map)
                .map_err(|e| e.to_string())
                .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
            if let Err(e) = written {
                output::print_error(&format!("Failed to write statement map to {}: {}", path, e));
                return 3;
            }
        }
        None => output::print_statement_map_summary(&file, &statement_map),
    }
    0
}
