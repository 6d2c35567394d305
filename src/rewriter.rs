//! Type-directed rewriting of `INSERT` value tuples.
//!
//! An [`InsertPlan`] is resolved once per statement from its table name and
//! column list, then applied to every value tuple of that statement:
//! - boolean-like columns: `1` becomes `TRUE`, `0` becomes `FALSE`, `NULL`
//!   stays; any other value is an error
//! - temporal columns: a zero-date sentinel (`'0000-00-00...'`) becomes `NULL`
//! - other columns are left alone
//!
//! Separators inside a tuple are preserved, so a tuple without rewritable
//! values comes out byte-for-byte identical.

use crate::schema::{SchemaDirectory, SchemaError, SemanticType};
use crate::tokenizer::{Token, TokenizeError, join, tokenize};

/// Errors that abort rewriting.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The statement's column list disagrees with the schema.
    #[error(
        "Column count mismatch for line {line} in table {table}:\nschema:    {}\nstatement: {}",
        sorted(.expected),
        sorted(.found)
    )]
    ColumnCountMismatch {
        /// Input line number.
        line: usize,
        /// Table name.
        table: String,
        /// Data-bearing columns reported by the schema.
        expected: Vec<String>,
        /// Columns declared by the statement.
        found: Vec<String>,
    },
    /// A boolean-like column holds something other than `0`, `1` or `NULL`.
    #[error("Unexpected value for {column} on line {line}: {value}")]
    UnexpectedBooleanValue {
        /// Input line number.
        line: usize,
        /// Column name.
        column: String,
        /// The offending literal.
        value: String,
    },
    /// A value tuple does not have one value per column.
    #[error("Value tuple at position {pos} on line {line} has {found} values, expected {expected}")]
    TupleArityMismatch {
        /// Input line number.
        line: usize,
        /// Byte offset of the tuple in the line.
        pos: usize,
        /// Number of declared columns.
        expected: usize,
        /// Number of values in the tuple.
        found: usize,
    },
    /// The table is unknown and unknown tables are not tolerated.
    #[error("Invalid table on line {line}: {table}")]
    UnknownTable {
        /// Input line number.
        line: usize,
        /// Table name.
        table: String,
    },
    /// A column list or value tuple has text after its closing parenthesis.
    #[error("Malformed group at position {pos} on line {line}: {text}")]
    MalformedGroup {
        /// Input line number.
        line: usize,
        /// Byte offset of the group in the line.
        pos: usize,
        /// The group text as written.
        text: String,
    },
    /// Schema lookup failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A column list or tuple could not be re-tokenized.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
}

fn group_interior(group: &Token, line: usize) -> Result<&str, RewriteError> {
    group.interior().ok_or_else(|| RewriteError::MalformedGroup {
        line,
        pos: group.pos(),
        text: group.as_str().to_owned(),
    })
}

fn sorted(columns: &[String]) -> String {
    let mut columns: Vec<&str> = columns.iter().map(String::as_str).collect();
    columns.sort_unstable();
    columns.join(", ")
}

/// Number of values rewritten, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteCounts {
    /// `0`/`1` values turned into `FALSE`/`TRUE`.
    pub booleans: usize,
    /// Zero-date sentinels turned into `NULL`.
    pub zero_dates: usize,
}

impl core::ops::AddAssign for RewriteCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.booleans += rhs.booleans;
        self.zero_dates += rhs.zero_dates;
    }
}

/// Column metadata of one `INSERT` statement, aligned with its column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPlan {
    line: usize,
    columns: Vec<String>,
    types: Vec<SemanticType>,
}

impl InsertPlan {
    /// Resolve the plan for `table` and the statement's column-list token.
    ///
    /// Returns `Ok(None)` if the directory does not know the table.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::ColumnCountMismatch`] if the column list does
    /// not declare exactly the table's data-bearing columns,
    /// [`RewriteError::MalformedGroup`] if text follows the column list, or a
    /// schema error if a declared column is unknown.
    pub fn resolve<D: SchemaDirectory + ?Sized>(
        table: &str,
        column_list: &Token,
        directory: &D,
        line: usize,
    ) -> Result<Option<Self>, RewriteError> {
        if !directory.table_exists(table) {
            return Ok(None);
        }

        let columns: Vec<String> = tokenize(group_interior(column_list, line)?)?
            .iter()
            .filter(|t| !t.is_separator())
            .map(|t| t.unquoted().to_owned())
            .collect();

        let expected = directory.columns_of(table)?;
        if expected.len() != columns.len() {
            return Err(RewriteError::ColumnCountMismatch {
                line,
                table: table.to_owned(),
                expected: expected.into_iter().map(str::to_owned).collect(),
                found: columns,
            });
        }

        let types = columns
            .iter()
            .map(|column| directory.semantic_type_of(table, column))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Self {
            line,
            columns,
            types,
        }))
    }

    /// The declared column names, quoting removed.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The semantic type of each declared column.
    #[must_use]
    pub fn types(&self) -> &[SemanticType] {
        &self.types
    }

    /// Whether any column may need a value rewritten.
    #[must_use]
    pub fn needs_rewrite(&self) -> bool {
        self.types.iter().any(|t| t.needs_rewrite())
    }

    /// Rewrite one value tuple, returning its replacement token.
    ///
    /// Tuples are returned unchanged when no column needs rewriting.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::TupleArityMismatch`] if the tuple's value count
    /// differs from the column count,
    /// [`RewriteError::MalformedGroup`] if text follows the tuple, and
    /// [`RewriteError::UnexpectedBooleanValue`] for a boolean-like column
    /// holding anything but `0`, `1` or `NULL`.
    pub fn rewrite(
        &self,
        tuple: &Token,
        counts: &mut RewriteCounts,
    ) -> Result<Token, RewriteError> {
        if !self.needs_rewrite() {
            return Ok(tuple.clone());
        }

        let mut values = tokenize(group_interior(tuple, self.line)?)?;

        let found = values.iter().filter(|t| !t.is_separator()).count();
        if found != self.types.len() {
            return Err(RewriteError::TupleArityMismatch {
                line: self.line,
                pos: tuple.pos(),
                expected: self.types.len(),
                found,
            });
        }

        let columns = self.columns.iter().zip(&self.types);
        for (value, (column, semantic_type)) in values
            .iter_mut()
            .filter(|t| !t.is_separator())
            .zip(columns)
        {
            match semantic_type {
                SemanticType::Boolean => {
                    let literal = match value.as_str() {
                        "1" => "TRUE",
                        "0" => "FALSE",
                        _ if value.is_keyword("NULL") => continue,
                        other => {
                            return Err(RewriteError::UnexpectedBooleanValue {
                                line: self.line,
                                column: column.clone(),
                                value: other.to_owned(),
                            });
                        }
                    };
                    *value = Token::new(literal, value.pos());
                    counts.booleans += 1;
                }
                SemanticType::Temporal if is_zero_date(value.as_str()) => {
                    *value = Token::new("NULL", value.pos());
                    counts.zero_dates += 1;
                }
                SemanticType::Temporal | SemanticType::Other => {}
            }
        }

        Ok(Token::new(format!("({})", join(&values)), tuple.pos()))
    }
}

/// Rewrite a single value tuple of an `INSERT` into `table`.
///
/// Unknown tables leave the tuple unchanged.
///
/// # Errors
///
/// See [`InsertPlan::resolve`] and [`InsertPlan::rewrite`].
///
/// # Example
///
/// ```
/// use sqldump_rewrite::rewriter::rewrite;
/// use sqldump_rewrite::schema::SchemaCatalog;
/// use sqldump_rewrite::tokenizer::Token;
///
/// let schema =
///     SchemaCatalog::from_ddl("CREATE TABLE users (active tinyint(1), name text)").unwrap();
/// let columns = Token::new("(active, name)", 0);
/// let tuple = rewrite("users", &columns, &Token::new("(1, 'bob')", 0), &schema).unwrap();
/// assert_eq!(tuple.as_str(), "(TRUE, 'bob')");
/// ```
pub fn rewrite<D: SchemaDirectory + ?Sized>(
    table: &str,
    column_list: &Token,
    tuple: &Token,
    directory: &D,
) -> Result<Token, RewriteError> {
    match InsertPlan::resolve(table, column_list, directory, 0)? {
        Some(plan) => plan.rewrite(tuple, &mut RewriteCounts::default()),
        None => Ok(tuple.clone()),
    }
}

/// Whether a literal starts with a quoted all-zero date such as
/// `'0000-00-00` or `'0000/00/00`.
#[must_use]
pub fn is_zero_date(literal: &str) -> bool {
    let Some(rest) = literal.strip_prefix(['\'', '"']) else {
        return false;
    };
    let is_separator = |b: u8| matches!(b, b'-' | b'/' | b'.');
    match rest.as_bytes() {
        [b'0', b'0', b'0', b'0', sep1, b'0', b'0', sep2, b'0', b'0', ..] => {
            is_separator(*sep1) && is_separator(*sep2)
        }
        _ => false,
    }
}
