pub mod coverage;
pub mod error;
pub mod log;
pub mod mutants;
pub mod mutator;
pub mod node;
pub mod operators;
pub mod output;
pub mod parser;
pub mod registry;
pub mod source;

pub use coverage::{CoverageInstrumenter, StageState, StatementMap};
pub use error::{MutateError, ReadError};
pub use mutants::Mutant;
pub use mutator::Mutator;
pub use registry::OperatorRegistry;
