use crate::error::AnalysisError;
use crate::parser::{parse_sql_with_dialect, statement_query};
use crate::types::{AnalysisOptions, AnalysisResult};
use sqlparser::ast::{Query, Statement};
#[cfg(feature = "tracing")]
use tracing::{info_span, warn};

mod columns;
mod composite;
mod correlate;
mod final_output;
mod functions;
mod input;
mod lineage;
mod nested;
mod tables;
mod visitor;

use composite::ColumnUsageVisitor;
use final_output::FinalOutputVisitor;
use lineage::LineageBuilder;
use nested::{CteVisitor, NestedScope, SubqueryVisitor};
use tables::TableVisitor;

pub use input::{analyze_batch, split_batches, BatchResults};

/// Main entry point for SQL analysis.
///
/// Syntax errors do not fail the call: they are reported in
/// [`AnalysisResult::errors`] and every other list is left empty. Only empty input
/// is rejected.
pub fn analyze(sql: &str, options: &AnalysisOptions) -> Result<AnalysisResult, AnalysisError> {
    if sql.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    #[cfg(feature = "tracing")]
    let _span = info_span!("analyze", dialect = %options.dialect, len = sql.len()).entered();
    Ok(Analyzer::new(options).analyze_fragment(sql, 0, &[]))
}

/// Runs the passes over one fragment and recurses into nested fragments.
pub(crate) struct Analyzer<'a> {
    options: &'a AnalysisOptions,
}

impl<'a> Analyzer<'a> {
    pub(crate) fn new(options: &'a AnalysisOptions) -> Self {
        Self { options }
    }

    /// Analysis of a CTE body or subquery one level below its parent.
    ///
    /// `None` when nested analysis is switched off or `depth` exceeds the
    /// configured limit.
    pub(crate) fn analyze_nested(
        &self,
        sql: &str,
        depth: usize,
        cte_names: &[String],
    ) -> Option<AnalysisResult> {
        if !self.options.analyze_nested_queries {
            return None;
        }
        if depth > self.options.max_nesting_depth {
            #[cfg(feature = "tracing")]
            warn!(depth, limit = self.options.max_nesting_depth, "nesting depth limit reached");
            return None;
        }
        #[cfg(feature = "tracing")]
        let _span = info_span!("analyze_nested", depth).entered();
        Some(self.analyze_fragment(sql, depth, cte_names))
    }

    fn analyze_fragment(&self, sql: &str, depth: usize, cte_names: &[String]) -> AnalysisResult {
        match parse_sql_with_dialect(sql, self.options.dialect) {
            Ok(statements) => self.analyze_statements(sql, &statements, depth, cte_names),
            Err(err) => AnalysisResult::from_errors(sql, vec![err.to_positioned_string()]),
        }
    }

    /// Analyzes already parsed statements as one script whose text is `sql`.
    pub(crate) fn analyze_statements(
        &self,
        sql: &str,
        statements: &[Statement],
        depth: usize,
        cte_names: &[String],
    ) -> AnalysisResult {
        let mut result = AnalysisResult::new(sql);
        for query in statements.iter().filter_map(statement_query) {
            result.absorb(self.analyze_query(query, depth, cte_names));
        }

        correlate::correlate(&mut result);
        if !self.options.include_inner_tables {
            result.tables.retain(|table| table.direct_reference);
        }
        if self.options.deduplicate_results {
            result.deduplicate();
        }
        result
    }

    fn analyze_query(&self, query: &Query, depth: usize, cte_names: &[String]) -> AnalysisResult {
        let tables = TableVisitor::new(cte_names).collect(query);
        let columns = ColumnUsageVisitor::collect(query);

        let scope = NestedScope::new(self, depth, query, cte_names);
        let ctes = CteVisitor::collect(query, &scope);
        let subqueries = SubqueryVisitor::collect(query, &scope);

        let column_lineage = if self.options.build_column_lineage {
            LineageBuilder::build(query, &tables)
        } else {
            Vec::new()
        };

        AnalysisResult {
            tables,
            select_columns: columns.select,
            predicate_columns: columns.predicate,
            join_columns: columns.join,
            group_by_columns: columns.group_by,
            order_by_columns: columns.order_by,
            ctes,
            subqueries,
            column_lineage,
            final_output_columns: FinalOutputVisitor::collect(query),
            ..AnalysisResult::default()
        }
    }
}
