//! Types for the query structure analysis API.
//!
//! Options go in ([`AnalysisOptions`], [`FormatOptions`]), an [`AnalysisResult`]
//! comes out. Every type serializes to camelCase JSON.

mod common;
mod request;
mod response;

pub use common::{
    ColumnUsage, ExpressionKind, JoinType, SubQueryType, TableType, TransformationType,
};
pub use request::{AnalysisOptions, Dialect, FormatOptions, DEFAULT_MAX_NESTING_DEPTH};
pub use response::{
    AnalysisResult, ColumnLineage, ColumnReference, CteDefinition, SourceColumn, SubQueryInfo,
    SyntaxValidation, TableReference,
};
