//! Minimal DDL parser for exported schema files.
//!
//! This module only understands what is needed to recover column lists and
//! column types from a schema-only dump (`mysqldump --no-data`):
//! - `CREATE TABLE` statements, with column definitions and type parameters
//!
//! Every other statement is skipped. This is intentionally limited compared to
//! a full SQL parser, as the schema directory only needs names and types.

mod lexer;
mod parser;

pub use lexer::{Lexer, LexerError, Token, TokenKind};
pub use parser::{ColumnDef, CreateTable, ParseError, Parser};
