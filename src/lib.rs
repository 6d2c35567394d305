#![doc = include_str!("../README.md")]
#![deny(clippy::mod_module_files)]

pub mod assembler;
pub mod errors;
pub mod rewriter;
pub mod schema;
pub mod sql;
pub mod statement;
pub mod tokenizer;

// Re-export main types
pub use assembler::{RewriteOptions, RunSummary, StreamRewriter, Warning};
pub use rewriter::{InsertPlan, RewriteCounts, RewriteError};
pub use schema::{SchemaCatalog, SchemaDirectory, SchemaError, SemanticType};
pub use statement::{InsertStatement, Statement, classify};
pub use tokenizer::{Token, TokenizeError, tokenize};

// Re-export errors
pub use errors::Error;
