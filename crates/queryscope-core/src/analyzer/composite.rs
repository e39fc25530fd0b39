//! Composite column visitor: the five clause-specific column lists of one query level.
//!
//! A single pass fills SELECT, WHERE/HAVING, JOIN, GROUP BY and ORDER BY lists. The
//! pass never enters CTE bodies, subqueries or derived tables, so a column written
//! inside one of those shows up only in that fragment's nested analysis.

use super::columns::{build_select_item, column_from_expr, column_from_object_name};
use super::visitor::{walk_expr, walk_query, walk_set_expr, Visitor};
use crate::types::{ColumnReference, ColumnUsage};
use sqlparser::ast::{
    Cte, Expr, JoinConstraint, OrderByExpr, Query, SelectItem, SetExpr,
};

#[derive(Debug)]
pub(crate) struct ColumnUsageVisitor {
    pub(crate) select: Vec<ColumnReference>,
    pub(crate) predicate: Vec<ColumnReference>,
    pub(crate) join: Vec<ColumnReference>,
    pub(crate) group_by: Vec<ColumnReference>,
    pub(crate) order_by: Vec<ColumnReference>,
    /// Clause the expression being walked belongs to. Mentions outside any tracked
    /// clause (VALUES rows, QUALIFY) are not collected.
    clause: Option<ColumnUsage>,
    ascending: bool,
}

impl Default for ColumnUsageVisitor {
    fn default() -> Self {
        Self {
            select: Vec::new(),
            predicate: Vec::new(),
            join: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            clause: None,
            ascending: true,
        }
    }
}

impl ColumnUsageVisitor {
    pub(crate) fn collect(query: &Query) -> Self {
        let mut visitor = Self::default();
        walk_query(&mut visitor, query);
        visitor
    }

    fn in_clause(&mut self, usage: ColumnUsage, f: impl FnOnce(&mut Self)) {
        let outer = self.clause.replace(usage);
        f(self);
        self.clause = outer;
    }

    fn record(&mut self, mut column: ColumnReference) {
        match column.usage {
            ColumnUsage::Select => self.select.push(column),
            ColumnUsage::Where | ColumnUsage::Having => self.predicate.push(column),
            ColumnUsage::Join => self.join.push(column),
            ColumnUsage::GroupBy => self.group_by.push(column),
            ColumnUsage::OrderBy => {
                column.ascending = self.ascending;
                self.order_by.push(column);
            }
        }
    }
}

impl Visitor for ColumnUsageVisitor {
    // Reached only for nested scopes; the level's own query is entered via `collect`.
    fn visit_query(&mut self, _query: &Query) {}

    fn visit_cte(&mut self, _cte: &Cte) {}

    fn visit_set_expr(&mut self, set_expr: &SetExpr) {
        match set_expr {
            // A parenthesized query is still the same level.
            SetExpr::Query(query) => walk_query(self, query),
            other => walk_set_expr(self, other),
        }
    }

    fn visit_select_item(&mut self, item: &SelectItem) {
        self.record(build_select_item(item));
    }

    fn visit_join_constraint(&mut self, constraint: &JoinConstraint) {
        match constraint {
            JoinConstraint::On(expr) => self.in_clause(ColumnUsage::Join, |v| v.visit_expr(expr)),
            JoinConstraint::Using(columns) => {
                for name in columns {
                    self.record(column_from_object_name(name, ColumnUsage::Join));
                }
            }
            _ => {}
        }
    }

    fn visit_where(&mut self, expr: &Expr) {
        self.in_clause(ColumnUsage::Where, |v| v.visit_expr(expr));
    }

    fn visit_having(&mut self, expr: &Expr) {
        self.in_clause(ColumnUsage::Having, |v| v.visit_expr(expr));
    }

    fn visit_group_by_expr(&mut self, expr: &Expr) {
        self.in_clause(ColumnUsage::GroupBy, |v| v.visit_expr(expr));
    }

    fn visit_order_by_expr(&mut self, order_by: &OrderByExpr) {
        self.ascending = order_by.options.asc.unwrap_or(true);
        self.in_clause(ColumnUsage::OrderBy, |v| v.visit_expr(&order_by.expr));
        self.ascending = true;
    }

    fn visit_expr(&mut self, expr: &Expr) {
        let Some(usage) = self.clause else {
            return;
        };
        match column_from_expr(expr, usage) {
            Some(column) => self.record(column),
            None => walk_expr(self, expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_sql_with_dialect, statement_query};
    use crate::types::Dialect;

    fn collect(sql: &str) -> ColumnUsageVisitor {
        let statements = parse_sql_with_dialect(sql, Dialect::Mssql).unwrap();
        ColumnUsageVisitor::collect(statement_query(&statements[0]).unwrap())
    }

    fn names(columns: &[ColumnReference]) -> Vec<String> {
        columns
            .iter()
            .map(|c| match &c.table_alias {
                Some(alias) => format!("{alias}.{}", c.column_name),
                None => c.column_name.clone(),
            })
            .collect()
    }

    #[test]
    fn test_clauses_are_separated() {
        let v = collect(
            "SELECT p.id, SUM(o.qty) AS qty FROM Products p \
             JOIN Orders o ON o.product_id = p.id \
             WHERE p.active = 1 \
             GROUP BY p.id \
             HAVING SUM(o.qty) > 10 \
             ORDER BY qty DESC, p.id",
        );
        assert_eq!(names(&v.select), vec!["p.id", "o.qty"]);
        assert_eq!(names(&v.join), vec!["o.product_id", "p.id"]);
        assert_eq!(names(&v.predicate), vec!["p.active", "o.qty"]);
        assert_eq!(v.predicate[1].usage, ColumnUsage::Having);
        assert_eq!(names(&v.group_by), vec!["p.id"]);
        assert_eq!(names(&v.order_by), vec!["qty", "p.id"]);
        assert!(!v.order_by[0].ascending);
        assert!(v.order_by[1].ascending);
    }

    #[test]
    fn test_nested_scopes_are_not_collected() {
        let v = collect(
            "WITH T AS (SELECT id, name, email FROM Users) \
             SELECT t.id, (SELECT MAX(x.v) FROM X x WHERE x.k = t.id) AS mx \
             FROM T t JOIN (SELECT d.a FROM D d WHERE d.b = 2) dd ON dd.a = t.id \
             WHERE t.name IN (SELECT n.name FROM N n WHERE n.z = 1) \
             AND EXISTS (SELECT 1 FROM E e WHERE e.id = t.id)",
        );
        assert_eq!(names(&v.select), vec!["t.id", "x.v"]);
        assert_eq!(names(&v.predicate), vec!["t.name"]);
        assert_eq!(names(&v.join), vec!["dd.a", "t.id"]);
        assert!(v.group_by.is_empty());
    }

    #[test]
    fn test_computed_group_by_walked() {
        let v = collect(
            "SELECT CASE WHEN c.age > 65 THEN 'senior' ELSE c.segment END AS bucket, COUNT(*) \
             FROM Customers c \
             GROUP BY CASE WHEN c.age > 65 THEN 'senior' ELSE c.segment END",
        );
        assert_eq!(names(&v.group_by), vec!["c.age", "c.segment"]);
        assert_eq!(v.select.len(), 2);
    }

    #[test]
    fn test_using_columns_are_join_columns() {
        let statements = parse_sql_with_dialect(
            "SELECT a.x FROM a JOIN b USING (id, region)",
            Dialect::Postgres,
        )
        .unwrap();
        let v = ColumnUsageVisitor::collect(statement_query(&statements[0]).unwrap());
        assert_eq!(names(&v.join), vec!["id", "region"]);
    }

    #[test]
    fn test_union_collects_both_sides() {
        let v = collect("SELECT a FROM t1 UNION SELECT b FROM t2 ORDER BY a");
        assert_eq!(names(&v.select), vec!["a", "b"]);
        assert_eq!(names(&v.order_by), vec!["a"]);
    }
}
