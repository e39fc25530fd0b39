//! Adapter over `sqlparser`: parsing, syntax validation and access to the query
//! a statement embeds.

use crate::error::ParseError;
use crate::types::{Dialect, SyntaxValidation};
use sqlparser::ast::{Query, Statement};
use sqlparser::parser::Parser;

/// Parse SQL using the specified dialect.
pub fn parse_sql_with_dialect(sql: &str, dialect: Dialect) -> Result<Vec<Statement>, ParseError> {
    let sqlparser_dialect = dialect.to_sqlparser_dialect();
    Parser::parse_sql(sqlparser_dialect.as_ref(), sql)
        .map_err(|err| ParseError::from(err).with_dialect(dialect))
}

/// Parse-only check. No analysis is performed.
///
/// Empty input is reported as invalid rather than failing, since nothing was parsed.
pub fn validate_syntax(sql: &str, dialect: Dialect) -> SyntaxValidation {
    if sql.trim().is_empty() {
        return SyntaxValidation {
            is_valid: false,
            errors: vec![ParseError::new("SQL input is empty").to_positioned_string()],
        };
    }
    match parse_sql_with_dialect(sql, dialect) {
        Ok(_) => SyntaxValidation {
            is_valid: true,
            errors: Vec::new(),
        },
        Err(err) => SyntaxValidation {
            is_valid: false,
            errors: vec![err.to_positioned_string()],
        },
    }
}

/// The query a statement carries, if any.
///
/// Plain queries, `INSERT ... SELECT`, `CREATE VIEW ... AS` and
/// `CREATE TABLE ... AS` qualify; other statements return `None`.
pub fn statement_query(statement: &Statement) -> Option<&Query> {
    match statement {
        Statement::Query(query) => Some(query),
        Statement::Insert(insert) => insert.source.as_deref(),
        Statement::CreateView { query, .. } => Some(query),
        Statement::CreateTable(create) => create.query.as_deref(),
        _ => None,
    }
}
