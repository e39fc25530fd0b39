//! Table visitor: every relation mentioned by one fragment.
//!
//! Relations inside subqueries and derived tables are reported too, with
//! `direct_reference = false`. CTE bodies are skipped; they belong to the CTE's own
//! nested analysis.

use super::visitor::{join_constraint, walk_expr, walk_query, Visitor};
use crate::types::{JoinType, TableReference, TableType};
use sqlparser::ast::{
    Cte, Expr, FunctionArguments, Join, JoinOperator, ObjectName, Query, TableAlias, TableFactor,
};
use std::mem;

/// Name given to the placeholder entry of a derived table.
pub(crate) const DERIVED_TABLE_NAME: &str = "[DerivedTable]";

/// Schemas whose relations are reported as views.
const SYSTEM_VIEW_SCHEMAS: &[&str] = &["information_schema", "sys"];

#[derive(Debug, Default)]
pub(crate) struct TableVisitor {
    tables: Vec<TableReference>,
    /// CTE names in scope: enclosing fragments first, then each `WITH` entered.
    cte_names: Vec<String>,
    join_type: Option<JoinType>,
    nested: bool,
}

impl TableVisitor {
    pub(crate) fn new(enclosing_ctes: &[String]) -> Self {
        Self {
            cte_names: enclosing_ctes.to_vec(),
            ..Self::default()
        }
    }

    pub(crate) fn collect(mut self, query: &Query) -> Vec<TableReference> {
        self.visit_query(query);
        self.tables
    }

    fn is_cte(&self, name: &str) -> bool {
        self.cte_names.iter().any(|cte| cte.eq_ignore_ascii_case(name))
    }

    fn push(&mut self, mut table: TableReference) {
        table.join_type = self.join_type;
        table.direct_reference = !self.nested;
        self.tables.push(table);
    }

    /// Runs `f` inside a nested scope. The join type does not leak into it.
    fn in_nested_scope(&mut self, f: impl FnOnce(&mut Self)) {
        let outer_nested = mem::replace(&mut self.nested, true);
        let outer_join = self.join_type.take();
        f(self);
        self.join_type = outer_join;
        self.nested = outer_nested;
    }

    fn named_table(&self, name: &ObjectName, alias: Option<&TableAlias>, has_args: bool) -> TableReference {
        let parts: Vec<&str> = name
            .0
            .iter()
            .filter_map(|part| part.as_ident())
            .map(|ident| ident.value.as_str())
            .collect();

        let mut table = match parts.as_slice() {
            [] => TableReference::new(name.to_string(), TableType::Table),
            [.., last] => TableReference::new(*last, TableType::Table),
        };
        let n = parts.len();
        if n >= 2 {
            table.schema = Some(parts[n - 2].to_string());
        }
        if n >= 3 {
            table.database = Some(parts[n - 3].to_string());
        }
        table.alias = alias.map(|a| a.name.value.clone());

        table.table_type = if has_args {
            TableType::TableValuedFunction
        } else if self.is_cte(&table.name) {
            table.schema = None;
            table.database = None;
            TableType::Cte
        } else if table.schema.as_deref().is_some_and(|schema| {
            SYSTEM_VIEW_SCHEMAS
                .iter()
                .any(|view_schema| view_schema.eq_ignore_ascii_case(schema))
        }) {
            TableType::View
        } else {
            TableType::Table
        };
        table
    }
}

fn table_function(name: impl Into<String>, alias: &Option<TableAlias>) -> TableReference {
    let mut table = TableReference::new(name, TableType::TableValuedFunction);
    table.alias = alias.as_ref().map(|a| a.name.value.clone());
    table
}

fn last_name_part(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_else(|| name.to_string())
}

/// Maps a join operator onto the five reported join kinds.
pub(crate) fn join_type(op: &JoinOperator) -> JoinType {
    match op {
        JoinOperator::Join(_)
        | JoinOperator::Inner(_)
        | JoinOperator::StraightJoin(_)
        | JoinOperator::Semi(_)
        | JoinOperator::Anti(_)
        | JoinOperator::AsOf { .. } => JoinType::Inner,
        JoinOperator::Left(_)
        | JoinOperator::LeftOuter(_)
        | JoinOperator::LeftSemi(_)
        | JoinOperator::LeftAnti(_)
        | JoinOperator::OuterApply => JoinType::Left,
        JoinOperator::Right(_)
        | JoinOperator::RightOuter(_)
        | JoinOperator::RightSemi(_)
        | JoinOperator::RightAnti(_) => JoinType::Right,
        JoinOperator::FullOuter(_) => JoinType::Full,
        JoinOperator::CrossJoin(_) | JoinOperator::CrossApply => JoinType::Cross,
    }
}

impl Visitor for TableVisitor {
    fn visit_query(&mut self, query: &Query) {
        let scope_start = self.cte_names.len();
        if let Some(with) = &query.with {
            self.cte_names.extend(
                with.cte_tables
                    .iter()
                    .map(|cte| cte.alias.name.value.clone()),
            );
        }
        walk_query(self, query);
        self.cte_names.truncate(scope_start);
    }

    fn visit_cte(&mut self, _cte: &Cte) {}

    fn visit_join(&mut self, join: &Join) {
        let outer = self.join_type.replace(join_type(&join.join_operator));
        self.visit_table_factor(&join.relation);
        self.join_type = outer;
        if let Some(constraint) = join_constraint(&join.join_operator) {
            self.visit_join_constraint(constraint);
        }
    }

    fn visit_table_factor(&mut self, table: &TableFactor) {
        match table {
            TableFactor::Table {
                name, alias, args, ..
            } => {
                let table = self.named_table(name, alias.as_ref(), args.is_some());
                self.push(table);
            }
            TableFactor::Derived {
                subquery, alias, ..
            } => {
                let mut placeholder = TableReference::new(DERIVED_TABLE_NAME, TableType::DerivedTable);
                placeholder.alias = alias.as_ref().map(|a| a.name.value.clone());
                self.push(placeholder);
                self.in_nested_scope(|visitor| visitor.visit_query(subquery));
            }
            TableFactor::Function { name, alias, .. } => {
                self.push(table_function(last_name_part(name), alias));
            }
            TableFactor::TableFunction { expr, alias } => {
                let name = match expr {
                    Expr::Function(function) => last_name_part(&function.name),
                    _ => "[TableFunction]".to_string(),
                };
                self.push(table_function(name, alias));
            }
            TableFactor::UNNEST { alias, .. } => self.push(table_function("UNNEST", alias)),
            TableFactor::JsonTable { alias, .. } => self.push(table_function("JSON_TABLE", alias)),
            TableFactor::OpenJsonTable { alias, .. } => {
                self.push(table_function("OPENJSON", alias))
            }
            other => super::visitor::walk_table_factor(self, other),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Subquery(subquery) | Expr::Exists { subquery, .. } => {
                self.in_nested_scope(|visitor| visitor.visit_query(subquery));
            }
            Expr::InSubquery { expr, subquery, .. } => {
                self.visit_expr(expr);
                self.in_nested_scope(|visitor| visitor.visit_query(subquery));
            }
            Expr::Function(function) if matches!(function.args, FunctionArguments::Subquery(_)) => {
                self.in_nested_scope(|visitor| walk_expr(visitor, expr));
            }
            _ => walk_expr(self, expr),
        }
    }
}
