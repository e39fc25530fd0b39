//! Structural analysis of SQL queries.
//!
//! [`analyze`] parses a query and reports the tables it reads, the columns each
//! clause mentions, its CTEs and subqueries (each with its own recursive analysis),
//! output-column lineage and the columns the outermost query returns.
//!
//! ```
//! use queryscope_core::{analyze, AnalysisOptions};
//!
//! let result = analyze(
//!     "WITH T AS (SELECT id, name, email FROM Users) SELECT t.id, t.name FROM T t",
//!     &AnalysisOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(result.final_output_columns.len(), 2);
//! assert_eq!(result.ctes[0].name, "T");
//! ```

pub mod analyzer;
pub mod error;
pub mod formatter;
pub mod parser;
pub mod types;

pub use analyzer::{analyze, analyze_batch, split_batches, BatchResults};
pub use error::{AnalysisError, ParseError, ParseErrorKind, Position};
pub use formatter::format;
pub use parser::{parse_sql_with_dialect, statement_query, validate_syntax};

pub use types::{
    AnalysisOptions, AnalysisResult, ColumnLineage, ColumnReference, ColumnUsage, CteDefinition,
    Dialect, ExpressionKind, FormatOptions, JoinType, SourceColumn, SubQueryInfo, SubQueryType,
    SyntaxValidation, TableReference, TableType, TransformationType, DEFAULT_MAX_NESTING_DEPTH,
};
