//! Batch input: T-SQL `GO` separated scripts, analyzed one statement at a time.

use super::Analyzer;
use crate::error::AnalysisError;
use crate::parser::parse_sql_with_dialect;
use crate::types::{AnalysisOptions, AnalysisResult};
use regex::Regex;
use sqlparser::ast::Statement;
use std::collections::VecDeque;
use std::sync::LazyLock;
use std::vec;
#[cfg(feature = "tracing")]
use tracing::debug;

/// A line holding only `GO`, in any case, optionally followed by `;`.
static BATCH_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*GO[ \t]*;?[ \t]*\r?$").expect("batch separator regex is valid")
});

/// Splits a script into batches on `GO` separator lines.
///
/// Batches are trimmed. Empty batches (leading, trailing or doubled separators)
/// are dropped.
pub fn split_batches(sql: &str) -> Vec<String> {
    BATCH_SEPARATOR
        .split(sql)
        .map(str::trim)
        .filter(|batch| !batch.is_empty())
        .map(str::to_string)
        .collect()
}

/// Analyzes every statement of every batch independently.
///
/// Work happens as the iterator is advanced: a batch is parsed when its first
/// statement is requested, and each statement is analyzed when it is yielded. A
/// batch that does not parse yields one result carrying its errors and text.
pub fn analyze_batch(
    sql: &str,
    options: &AnalysisOptions,
) -> Result<BatchResults, AnalysisError> {
    if sql.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    let batches: VecDeque<String> = split_batches(sql).into();
    #[cfg(feature = "tracing")]
    debug!(batches = batches.len(), "split batch input");
    Ok(BatchResults {
        options: options.clone(),
        batches,
        statements: Vec::new().into_iter(),
    })
}

/// Lazy sequence of per-statement results returned by [`analyze_batch`].
#[derive(Debug)]
pub struct BatchResults {
    options: AnalysisOptions,
    batches: VecDeque<String>,
    statements: vec::IntoIter<Statement>,
}

impl Iterator for BatchResults {
    type Item = AnalysisResult;

    fn next(&mut self) -> Option<AnalysisResult> {
        loop {
            if let Some(statement) = self.statements.next() {
                let text = statement.to_string();
                let analyzer = Analyzer::new(&self.options);
                return Some(analyzer.analyze_statements(&text, &[statement], 0, &[]));
            }
            let batch = self.batches.pop_front()?;
            match parse_sql_with_dialect(&batch, self.options.dialect) {
                Ok(statements) => self.statements = statements.into_iter(),
                Err(err) => {
                    return Some(AnalysisResult::from_errors(
                        batch,
                        vec![err.to_positioned_string()],
                    ))
                }
            }
        }
    }
}
