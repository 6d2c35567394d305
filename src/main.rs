//! Command-line interface for sqldump-rewrite.
//!
//! Reads a MySQL data dump, rewrites boolean and zero-date values against a
//! schema file, and writes a PostgreSQL load script.
//!
//! See the documentation on [`Cli`] for the command line flags.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, info};
use sqldump_rewrite::{Error, RewriteOptions, SchemaCatalog, StreamRewriter};

#[derive(Parser)]
#[command(name = "sqldump-rewrite")]
#[command(version)]
#[command(
    about = "Rewrite a MySQL dump for PostgreSQL",
    long_about = r#"
Rewrite a MySQL data dump for loading into PostgreSQL.

TINYINT(1) values in INSERT statements become TRUE/FALSE and zero dates become
NULL, using the column types of a schema file. Everything else is copied
verbatim, wrapped in a single transaction with deferred constraints.

Examples

# Rewrite dump.sql using the schema from `mysqldump --no-data`:

sqldump-rewrite -s schema.sql -i dump.sql -o load.sql

# Stream from stdin to stdout, with per-statement progress:

RUST_LOG=debug sqldump-rewrite -s schema.json -i - -o - < dump.sql > load.sql
"#
)]
struct Cli {
    /// Input dump, one statement per line (`-` for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output load script (`-` for stdout)
    #[arg(short, long)]
    output: PathBuf,

    /// Schema file: `CREATE TABLE` DDL, or a JSON schema document (`.json`)
    #[arg(short, long)]
    schema: PathBuf,

    /// Fail on INSERTs into tables missing from the schema
    #[arg(long, default_value_t = false)]
    strict_tables: bool,

    /// Do not wrap the output in session settings and a transaction
    #[arg(long, default_value_t = false)]
    no_transaction: bool,

    /// Verbose output
    ///
    /// When specified, sets the log level to `info` and ignores the `RUST_LOG`
    /// environment variable. When not specified, uses `RUST_LOG`
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

impl Cli {
    /// Main function to run the rewrite
    fn main(self) -> Result<(), Error> {
        // Configure logging
        if self.verbose {
            env_logger::builder().filter_level(LevelFilter::Info).init();
            info!("Verbose output enabled (ignoring RUST_LOG environment variable)");
        } else {
            env_logger::init();
        }

        let schema = SchemaCatalog::load(&self.schema)?;
        let options = RewriteOptions {
            wrap_transaction: !self.no_transaction,
            strict_tables: self.strict_tables,
        };
        let rewriter = StreamRewriter::with_options(schema, options);

        let reader = BufReader::new(open_input(&self.input)?);
        let writer = BufWriter::new(create_output(&self.output)?);
        let summary = rewriter.run(reader, writer)?;

        for warning in &summary.warnings {
            eprintln!("Warning: {warning}");
        }
        info!("Done: {summary}");
        Ok(())
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn open_input(path: &Path) -> Result<Box<dyn Read>, Error> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdin().lock()));
    }
    File::open(path)
        .map(|file| Box::new(file) as Box<dyn Read>)
        .map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn create_output(path: &Path) -> Result<Box<dyn Write>, Error> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdout().lock()));
    }
    File::create(path)
        .map(|file| Box::new(file) as Box<dyn Write>)
        .map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })
}
