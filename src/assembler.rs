//! Line-by-line driver turning a MySQL dump into a PostgreSQL load script.

use core::fmt;
use std::io::{BufRead, Write};

use crate::errors::Error;
use crate::rewriter::{InsertPlan, RewriteCounts, RewriteError};
use crate::schema::SchemaDirectory;
use crate::statement::{Statement, classify, table_name};
use crate::tokenizer::{join, tokenize};

/// Session settings and transaction start written before the statements.
///
/// Backslash escapes are accepted in string literals, and constraint checks
/// are deferred to the commit so rows may load in any order.
pub const PREAMBLE: &str = "SET client_min_messages TO ERROR;\n\
SET standard_conforming_strings = 'off';\n\
SET backslash_quote = 'on';\n\
\n\
BEGIN;\n\
SET CONSTRAINTS ALL DEFERRED;\n\
\n";

/// Written after the last statement.
pub const POSTAMBLE: &str = "\nCOMMIT;\n";

/// Run-level settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Wrap the output in [`PREAMBLE`] and [`POSTAMBLE`].
    pub wrap_transaction: bool,
    /// Fail on tables missing from the schema instead of passing them through.
    pub strict_tables: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            wrap_transaction: true,
            strict_tables: false,
        }
    }
}

/// A recoverable condition met during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An `INSERT` targets a table the schema does not know; it was copied
    /// unchanged.
    UnknownTable {
        /// Input line number.
        line: usize,
        /// Table name.
        table: String,
    },
    /// An `INSERT` without a column list, or with its first tuple glued to
    /// `VALUES`; it was copied unchanged.
    UnalignedInsert {
        /// Input line number.
        line: usize,
        /// Table name.
        table: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownTable { line, table } => {
                write!(f, "line {line}: invalid table {table}, statement left unchanged")
            }
            Warning::UnalignedInsert { line, table } => write!(
                f,
                "line {line}: INSERT into {table} has no usable column list, \
                 statement left unchanged"
            ),
        }
    }
}

/// Counters of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Input lines read.
    pub lines: usize,
    /// `INSERT` statements with a column list.
    pub inserts: usize,
    /// Value tuples passed through the rewriter.
    pub tuples: usize,
    /// Values rewritten.
    pub rewritten: RewriteCounts,
    /// Recoverable conditions, in input order.
    pub warnings: Vec<Warning>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lines, {} inserts, {} tuples, {} booleans and {} zero dates rewritten, {} warnings",
            self.lines,
            self.inserts,
            self.tuples,
            self.rewritten.booleans,
            self.rewritten.zero_dates,
            self.warnings.len()
        )
    }
}

/// Rewrites a dump stream against a schema directory.
#[derive(Debug, Clone)]
pub struct StreamRewriter<D> {
    directory: D,
    options: RewriteOptions,
}

impl<D: SchemaDirectory> StreamRewriter<D> {
    /// Create a rewriter with default options.
    #[must_use]
    pub fn new(directory: D) -> Self {
        Self::with_options(directory, RewriteOptions::default())
    }

    /// Create a rewriter with the given options.
    #[must_use]
    pub fn with_options(directory: D, options: RewriteOptions) -> Self {
        Self { directory, options }
    }

    /// The schema directory in use.
    #[must_use]
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Rewrite every line of `reader` into `writer`.
    ///
    /// Lines keep their terminators; one line is one statement.
    ///
    /// # Errors
    ///
    /// Stops at the first fatal error. Output written so far is incomplete
    /// and must not be loaded.
    pub fn run<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        mut writer: W,
    ) -> Result<RunSummary, Error> {
        let mut summary = RunSummary::default();

        if self.options.wrap_transaction {
            writer.write_all(PREAMBLE.as_bytes())?;
        }

        let mut line = String::new();
        loop {
            line.clear();
            let read = reader.read_line(&mut line).map_err(|source| Error::Read {
                line: summary.lines + 1,
                source,
            })?;
            if read == 0 {
                break;
            }
            summary.lines += 1;

            let output = self.rewrite_line(&line, summary.lines, &mut summary)?;
            writer.write_all(output.as_bytes())?;
        }

        if self.options.wrap_transaction {
            writer.write_all(POSTAMBLE.as_bytes())?;
        }
        writer.flush()?;

        log::info!("{summary}");
        Ok(summary)
    }

    /// Rewrite one statement line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be tokenized or one of its value
    /// tuples cannot be rewritten safely.
    pub fn rewrite_line(
        &self,
        line: &str,
        number: usize,
        summary: &mut RunSummary,
    ) -> Result<String, Error> {
        let mut tokens = tokenize(line).map_err(|source| Error::Tokenize {
            line: number,
            source,
        })?;

        let insert = match classify(&tokens) {
            Statement::Insert(insert) => insert,
            Statement::Unaligned { table } => {
                let warning = Warning::UnalignedInsert {
                    line: number,
                    table: table_name(&tokens[table]).to_owned(),
                };
                log::warn!("{warning}");
                summary.warnings.push(warning);
                return Ok(join(&tokens));
            }
            Statement::Other => {
                log::trace!("{number} passed through");
                return Ok(join(&tokens));
            }
        };
        summary.inserts += 1;

        let table = insert.table_name(&tokens).to_owned();
        let column_list = &tokens[insert.columns];
        let Some(plan) = InsertPlan::resolve(&table, column_list, &self.directory, number)? else {
            if self.options.strict_tables {
                return Err(RewriteError::UnknownTable {
                    line: number,
                    table,
                }
                .into());
            }
            let warning = Warning::UnknownTable {
                line: number,
                table,
            };
            log::warn!("{warning}");
            summary.warnings.push(warning);
            return Ok(join(&tokens));
        };

        let mut counts = RewriteCounts::default();
        for &idx in &insert.tuples {
            tokens[idx] = plan.rewrite(&tokens[idx], &mut counts)?;
        }
        summary.tuples += insert.tuples.len();
        summary.rewritten += counts;

        log::debug!(
            "{number} {} tuples into {table}, {} booleans, {} zero dates",
            insert.tuples.len(),
            counts.booleans,
            counts.zero_dates
        );
        Ok(join(&tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaCatalog;

    const SCHEMA: &str = "
CREATE TABLE `users` (
  `id` int(11) NOT NULL,
  `active` tinyint(1) NOT NULL,
  `name` varchar(64) NOT NULL,
  `created_at` datetime DEFAULT NULL,
  PRIMARY KEY (`id`)
);
CREATE TABLE `tags` (`id` int(11), `label` varchar(32));
";

    fn rewriter(options: RewriteOptions) -> StreamRewriter<SchemaCatalog> {
        StreamRewriter::with_options(SchemaCatalog::from_ddl(SCHEMA).unwrap(), options)
    }

    fn run(input: &str, options: RewriteOptions) -> Result<(String, RunSummary), Error> {
        let mut out = Vec::new();
        let summary = rewriter(options).run(input.as_bytes(), &mut out)?;
        Ok((String::from_utf8(out).unwrap(), summary))
    }

    fn bare() -> RewriteOptions {
        RewriteOptions {
            wrap_transaction: false,
            ..RewriteOptions::default()
        }
    }

    #[test]
    fn test_wrapped_output() {
        let (out, summary) = run("SET NAMES utf8;\n", RewriteOptions::default()).unwrap();
        assert_eq!(out, format!("{PREAMBLE}SET NAMES utf8;\n{POSTAMBLE}"));
        assert!(out.starts_with("SET client_min_messages TO ERROR;\n"));
        assert!(out.ends_with("\nCOMMIT;\n"));
        assert_eq!(summary.lines, 1);
        assert_eq!(summary.inserts, 0);
    }

    #[test]
    fn test_rewrites_inserts() {
        let input = "INSERT INTO \"users\" (\"id\", \"active\", \"name\", \"created_at\") VALUES (1,1,'a','0000-00-00 00:00:00'),(2,0,'b','2020-01-01 10:00:00');\n";
        let (out, summary) = run(input, bare()).unwrap();
        assert_eq!(
            out,
            "INSERT INTO \"users\" (\"id\", \"active\", \"name\", \"created_at\") VALUES (1,TRUE,'a',NULL),(2,FALSE,'b','2020-01-01 10:00:00');\n"
        );
        assert_eq!(summary.inserts, 1);
        assert_eq!(summary.tuples, 2);
        assert_eq!(
            summary.rewritten,
            RewriteCounts {
                booleans: 2,
                zero_dates: 1
            }
        );
    }

    #[test]
    fn test_non_insert_round_trip() {
        let input = "/*!40101 SET NAMES utf8 */;\nLOCK TABLES \"users\" WRITE;\n\nUNLOCK TABLES;";
        let (out, _) = run(input, bare()).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_no_op_table_round_trip() {
        let input = "INSERT INTO \"tags\" (\"id\", \"label\") VALUES (1,'x'),  (2,'y, z');\n";
        let (out, summary) = run(input, bare()).unwrap();
        assert_eq!(out, input);
        assert_eq!(summary.tuples, 2);
        assert_eq!(summary.rewritten, RewriteCounts::default());
    }

    #[test]
    fn test_unknown_table_warning() {
        let input = "INSERT INTO ghost_table (a) VALUES (1);\nINSERT INTO tags (id, label) VALUES (1,'x');\n";
        let (out, summary) = run(input, bare()).unwrap();
        assert_eq!(out, input);
        assert_eq!(
            summary.warnings,
            vec![Warning::UnknownTable {
                line: 1,
                table: "ghost_table".into()
            }]
        );
        assert_eq!(summary.lines, 2);
    }

    #[test]
    fn test_unaligned_insert_warning() {
        let input = concat!(
            "INSERT INTO \"users\" VALUES (1,1,'a',NULL);\n",
            "INSERT INTO users (id, active, name, created_at) VALUES(1,1,'a',NULL);\n",
        );
        let (out, summary) = run(input, bare()).unwrap();
        assert_eq!(out, input);
        assert_eq!(summary.inserts, 0);
        assert_eq!(
            summary.warnings,
            vec![
                Warning::UnalignedInsert {
                    line: 1,
                    table: "users".into()
                },
                Warning::UnalignedInsert {
                    line: 2,
                    table: "users".into()
                },
            ]
        );
        assert_eq!(
            summary.warnings[0].to_string(),
            "line 1: INSERT into users has no usable column list, statement left unchanged"
        );
    }

    #[test]
    fn test_unknown_table_strict() {
        let options = RewriteOptions {
            strict_tables: true,
            ..bare()
        };
        let result = run("INSERT INTO ghost_table (a) VALUES (1);\n", options);
        assert!(matches!(
            result,
            Err(Error::Rewrite(RewriteError::UnknownTable { line: 1, .. }))
        ));
    }

    #[test]
    fn test_unbalanced_line_is_fatal() {
        let input = "SET a = 1;\nINSERT INTO t (a) VALUES ('x\n";
        let result = run(input, bare());
        assert!(matches!(result, Err(Error::Tokenize { line: 2, .. })));
    }

    #[test]
    fn test_column_count_mismatch_is_fatal() {
        let input = "INSERT INTO users (id, active, name) VALUES (1,1,'a');\n";
        assert!(matches!(
            run(input, bare()),
            Err(Error::Rewrite(RewriteError::ColumnCountMismatch { line: 1, .. }))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let mut out = Vec::new();
        let input: &[u8] = b"SET a = 1;\n\xff\xfe\n";
        let result = rewriter(bare()).run(input, &mut out);
        assert!(matches!(result, Err(Error::Read { line: 2, .. })));
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary {
            lines: 3,
            inserts: 2,
            tuples: 5,
            rewritten: RewriteCounts {
                booleans: 4,
                zero_dates: 1,
            },
            warnings: vec![],
        };
        assert_eq!(
            summary.to_string(),
            "3 lines, 2 inserts, 5 tuples, 4 booleans and 1 zero dates rewritten, 0 warnings"
        );
    }
}
