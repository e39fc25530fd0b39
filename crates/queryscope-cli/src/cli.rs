//! CLI argument parsing using clap.

use clap::{ArgAction, Parser, ValueEnum};
use queryscope_core::{AnalysisOptions, Dialect, FormatOptions};
use std::path::PathBuf;

/// QueryScope - SQL query structure analyzer
#[derive(Parser, Debug)]
#[command(name = "queryscope")]
#[command(
    about = "Report the tables, columns, CTEs, subqueries and output lineage of SQL queries",
    long_about = None
)]
#[command(version)]
pub struct Args {
    /// SQL files to analyze (reads from stdin if none provided)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// SQL dialect
    #[arg(short, long, default_value = "mssql", value_enum)]
    pub dialect: DialectArg,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,

    /// Split input on GO lines and analyze each statement separately
    #[arg(short, long)]
    pub batch: bool,

    /// Skip nested CTE/subquery analysis and lineage
    #[arg(long)]
    pub performance: bool,

    /// Keep repeated columns and tables instead of deduplicating them
    #[arg(long)]
    pub raw: bool,

    /// Drop tables only referenced inside subqueries or derived tables
    #[arg(long)]
    pub no_inner_tables: bool,

    /// Only check syntax
    #[arg(long, conflicts_with_all = ["pretty_print", "batch"])]
    pub validate: bool,

    /// Print the input re-formatted instead of analyzing it
    #[arg(long, conflicts_with = "batch")]
    pub pretty_print: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress diagnostics on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn analysis_options(&self) -> AnalysisOptions {
        let base = if self.performance {
            AnalysisOptions::performance()
        } else {
            AnalysisOptions::comprehensive()
        };
        AnalysisOptions {
            deduplicate_results: !self.raw,
            include_inner_tables: !self.no_inner_tables,
            ..base.with_dialect(self.dialect.into())
        }
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            dialect: self.dialect.into(),
            pretty: !self.compact,
        }
    }
}

/// SQL dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Generic,
    Ansi,
    Bigquery,
    Clickhouse,
    Databricks,
    Duckdb,
    Hive,
    Mssql,
    Mysql,
    Postgres,
    Redshift,
    Snowflake,
    Sqlite,
}

impl From<DialectArg> for Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Generic => Dialect::Generic,
            DialectArg::Ansi => Dialect::Ansi,
            DialectArg::Bigquery => Dialect::Bigquery,
            DialectArg::Clickhouse => Dialect::Clickhouse,
            DialectArg::Databricks => Dialect::Databricks,
            DialectArg::Duckdb => Dialect::Duckdb,
            DialectArg::Hive => Dialect::Hive,
            DialectArg::Mssql => Dialect::Mssql,
            DialectArg::Mysql => Dialect::Mysql,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Redshift => Dialect::Redshift,
            DialectArg::Snowflake => Dialect::Snowflake,
            DialectArg::Sqlite => Dialect::Sqlite,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_conversion() {
        let dialect: Dialect = DialectArg::Postgres.into();
        assert_eq!(dialect, Dialect::Postgres);
    }

    #[test]
    fn test_parse_minimal_args() {
        let args = Args::parse_from(["queryscope", "test.sql"]);
        assert_eq!(args.files.len(), 1);
        assert_eq!(args.dialect, DialectArg::Mssql);
        assert_eq!(args.format, OutputFormat::Table);
        assert_eq!(args.verbose, 0);
        assert_eq!(args.analysis_options(), AnalysisOptions::default());
    }

    #[test]
    fn test_parse_full_args() {
        let args = Args::parse_from([
            "queryscope",
            "-d",
            "postgres",
            "-f",
            "json",
            "-o",
            "output.json",
            "--quiet",
            "--compact",
            "--raw",
            "--no-inner-tables",
            "--performance",
            "-vv",
            "file1.sql",
            "file2.sql",
        ]);
        assert_eq!(args.dialect, DialectArg::Postgres);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.output.as_ref().unwrap().to_str().unwrap(), "output.json");
        assert!(args.quiet);
        assert!(args.compact);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.files.len(), 2);

        let options = args.analysis_options();
        assert_eq!(options.dialect, Dialect::Postgres);
        assert!(!options.deduplicate_results);
        assert!(!options.include_inner_tables);
        assert!(!options.analyze_nested_queries);
        assert!(!options.build_column_lineage);
    }

    #[test]
    fn test_format_options_follow_compact() {
        let args = Args::parse_from(["queryscope", "--pretty-print", "--compact"]);
        assert!(!args.format_options().pretty);
    }

    #[test]
    fn test_validate_conflicts_with_pretty_print() {
        let result = Args::try_parse_from(["queryscope", "--validate", "--pretty-print"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_conflicts_with_pretty_print() {
        let result = Args::try_parse_from(["queryscope", "--batch", "--pretty-print"]);
        assert!(result.is_err());
    }
}
