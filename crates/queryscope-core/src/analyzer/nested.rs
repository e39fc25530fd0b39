//! CTE and subquery visitors: record each nested fragment of one level and hand its
//! text to a fresh analysis one level deeper.
//!
//! Neither visitor looks inside the fragments it records. A subquery nested in a
//! subquery is found by the inner analysis, not here, so every fragment is recorded
//! exactly once in the whole tree.

use super::visitor::{walk_expr, walk_query, walk_set_expr, walk_table_factor, Visitor};
use super::Analyzer;
use crate::types::{AnalysisResult, CteDefinition, SubQueryInfo, SubQueryType};
use sqlparser::ast::{
    Cte, Expr, Function, FunctionArguments, Query, SetExpr, TableAlias, TableFactor,
};
#[cfg(feature = "tracing")]
use tracing::debug;

/// What a nested fragment can see of the level that contains it.
pub(crate) struct NestedScope<'a> {
    analyzer: &'a Analyzer<'a>,
    /// Depth of the level holding the fragments.
    depth: usize,
    /// CTE names visible to the fragments: enclosing levels plus this level's `WITH`.
    cte_names: Vec<String>,
}

impl<'a> NestedScope<'a> {
    pub(crate) fn new(analyzer: &'a Analyzer<'a>, depth: usize, query: &Query, enclosing: &[String]) -> Self {
        let mut cte_names = enclosing.to_vec();
        if let Some(with) = &query.with {
            cte_names.extend(with.cte_tables.iter().map(|cte| cte.alias.name.value.clone()));
        }
        Self {
            analyzer,
            depth,
            cte_names,
        }
    }

    fn analyze(&self, sql: &str) -> Option<Box<AnalysisResult>> {
        self.analyzer
            .analyze_nested(sql, self.depth + 1, &self.cte_names)
            .map(Box::new)
    }
}

/// Records the CTEs of this level's `WITH` clause.
pub(crate) struct CteVisitor<'s> {
    scope: &'s NestedScope<'s>,
    ctes: Vec<CteDefinition>,
}

impl<'s> CteVisitor<'s> {
    pub(crate) fn collect(query: &Query, scope: &'s NestedScope<'s>) -> Vec<CteDefinition> {
        let mut visitor = Self {
            scope,
            ctes: Vec::new(),
        };
        visitor.visit_query(query);
        visitor.ctes
    }
}

impl Visitor for CteVisitor<'_> {
    // A `WITH` further down belongs to the fragment that declares it.
    fn visit_query(&mut self, query: &Query) {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.visit_cte(cte);
            }
        }
    }

    fn visit_cte(&mut self, cte: &Cte) {
        let name = cte.alias.name.value.clone();
        let body = cte.query.to_string();
        #[cfg(feature = "tracing")]
        debug!(cte = %name, depth = self.scope.depth, "registered CTE");
        let inner_analysis = self.scope.analyze(&body);
        self.ctes.push(CteDefinition {
            name,
            columns: cte
                .alias
                .columns
                .iter()
                .map(|column| column.name.value.clone())
                .collect(),
            query: body,
            inner_analysis,
        });
    }
}

/// Records derived tables and scalar, EXISTS and IN subqueries of this level.
///
/// A query passed as a function's sole argument (`ARRAY(SELECT ...)`) is recorded as
/// a scalar subquery.
pub(crate) struct SubqueryVisitor<'s> {
    scope: &'s NestedScope<'s>,
    subqueries: Vec<SubQueryInfo>,
}

impl<'s> SubqueryVisitor<'s> {
    pub(crate) fn collect(query: &Query, scope: &'s NestedScope<'s>) -> Vec<SubQueryInfo> {
        let mut visitor = Self {
            scope,
            subqueries: Vec::new(),
        };
        walk_query(&mut visitor, query);
        visitor.subqueries
    }

    fn record(&mut self, subquery_type: SubQueryType, alias: Option<&TableAlias>, query: &Query) {
        let text = query.to_string();
        #[cfg(feature = "tracing")]
        debug!(kind = ?subquery_type, depth = self.scope.depth, "recorded subquery");
        let inner_analysis = self.scope.analyze(&text);
        self.subqueries.push(SubQueryInfo {
            alias: alias.map(|a| a.name.value.clone()),
            query: text,
            subquery_type,
            inner_analysis,
        });
    }
}

impl Visitor for SubqueryVisitor<'_> {
    fn visit_query(&mut self, _query: &Query) {}

    fn visit_cte(&mut self, _cte: &Cte) {}

    fn visit_set_expr(&mut self, set_expr: &SetExpr) {
        match set_expr {
            SetExpr::Query(query) => walk_query(self, query),
            other => walk_set_expr(self, other),
        }
    }

    fn visit_table_factor(&mut self, table: &TableFactor) {
        match table {
            TableFactor::Derived {
                subquery, alias, ..
            } => self.record(SubQueryType::DerivedTable, alias.as_ref(), subquery),
            other => walk_table_factor(self, other),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Subquery(subquery) => self.record(SubQueryType::ScalarSubquery, None, subquery),
            Expr::Exists { subquery, .. } => {
                self.record(SubQueryType::ExistsSubquery, None, subquery)
            }
            Expr::InSubquery { expr, subquery, .. } => {
                self.visit_expr(expr);
                self.record(SubQueryType::InSubquery, None, subquery);
            }
            Expr::Function(Function {
                args: FunctionArguments::Subquery(subquery),
                ..
            }) => {
                self.record(SubQueryType::ScalarSubquery, None, subquery);
                walk_expr(self, expr);
            }
            _ => walk_expr(self, expr),
        }
    }
}
