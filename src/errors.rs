//! Submodule defining the errors used across the crate.

use std::path::PathBuf;

use crate::rewriter::RewriteError;
use crate::schema::SchemaError;
use crate::tokenizer::TokenizeError;

/// Errors that abort a rewrite run.
///
/// A half-rewritten dump is unsafe to load, so every variant is fatal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A statement has an unclosed quote or parenthesis.
    #[error("Cannot tokenize line {line}: {source}")]
    Tokenize {
        /// Input line number.
        line: usize,
        /// Underlying tokenizer error.
        source: TokenizeError,
    },
    /// A statement cannot be rewritten safely.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
    /// The schema directory failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// An input or output file could not be opened.
    #[error("Cannot open {}: {source}", .path.display())]
    Open {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A line could not be read or is not valid UTF-8.
    #[error("Cannot read line {line}: {source}")]
    Read {
        /// Input line number.
        line: usize,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The output could not be written.
    #[error("Cannot write output: {0}")]
    Write(#[from] std::io::Error),
}
