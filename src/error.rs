use camino::Utf8PathBuf;
use thiserror::Error;

use crate::operators::OperatorError;
use crate::parser::ParseError;

/// Why a `mutate` call gave up.
#[derive(Debug, Error)]
pub enum MutateError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Operator '{operator}' failed on '{path}': {source}")]
    Operator {
        operator: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: OperatorError,
    },
}

/// File-read failures, classified once where the I/O happens.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("File not found: {0}")]
    NotFound(Utf8PathBuf),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MutateError>;
