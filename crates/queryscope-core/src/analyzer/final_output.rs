//! Final-output visitor: the columns a query hands back to its caller.
//!
//! The CTE prologue is skipped without entering any body. A set operation resolves to
//! its leftmost operand, because SQL names the result columns after the first query of
//! a UNION/INTERSECT/EXCEPT chain. The first SELECT list reached is the answer.

use super::columns::build_select_item;
use super::visitor::Visitor;
use crate::types::ColumnReference;
use sqlparser::ast::{Expr, Query, Select, SetExpr};

#[derive(Debug, Default)]
pub(crate) struct FinalOutputVisitor {
    columns: Vec<ColumnReference>,
    found: bool,
}

impl FinalOutputVisitor {
    pub(crate) fn collect(query: &Query) -> Vec<ColumnReference> {
        let mut visitor = Self::default();
        visitor.visit_query(query);
        visitor.columns
    }
}

impl Visitor for FinalOutputVisitor {
    fn visit_query(&mut self, query: &Query) {
        if !self.found {
            self.visit_set_expr(&query.body);
        }
    }

    fn visit_set_expr(&mut self, set_expr: &SetExpr) {
        match set_expr {
            SetExpr::Select(select) => self.visit_select(select),
            SetExpr::Query(query) => self.visit_query(query),
            SetExpr::SetOperation { left, .. } => self.visit_set_expr(left),
            _ => {}
        }
    }

    fn visit_select(&mut self, select: &Select) {
        if self.found {
            return;
        }
        self.found = true;
        self.columns
            .extend(select.projection.iter().map(build_select_item));
    }

    fn visit_expr(&mut self, _expr: &Expr) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_sql_with_dialect, statement_query};
    use crate::types::{Dialect, ExpressionKind};

    fn final_columns(sql: &str) -> Vec<ColumnReference> {
        let statements = parse_sql_with_dialect(sql, Dialect::Mssql).unwrap();
        FinalOutputVisitor::collect(statement_query(&statements[0]).unwrap())
    }

    #[test]
    fn test_cte_prologue_skipped() {
        let columns = final_columns(
            "WITH T AS (SELECT id, name, email FROM Users) SELECT t.id, t.name FROM T t",
        );
        let names: Vec<&str> = columns.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn test_set_operation_uses_leftmost_operand() {
        let columns = final_columns(
            "SELECT a AS first_name FROM t1 UNION SELECT b AS second_name FROM t2 \
             UNION ALL SELECT c FROM t3",
        );
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].output_name(), "first_name");
    }

    #[test]
    fn test_parenthesized_query() {
        let columns = final_columns("(SELECT x, y FROM t) EXCEPT (SELECT x, y FROM u)");
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn test_one_entry_per_item() {
        let columns = final_columns(
            "SELECT p.id, (SELECT COUNT(*) FROM Orders) AS cnt, COALESCE(p.a, p.b) FROM Products p",
        );
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[1].output_name(), "cnt");
        assert_eq!(columns[1].expression_kind, ExpressionKind::Subquery);
        assert_eq!(columns[2].column_name, "a");
        assert_eq!(columns[2].expression_kind, ExpressionKind::Function);
    }

    #[test]
    fn test_values_has_no_output_columns() {
        let statements =
            parse_sql_with_dialect("INSERT INTO t (a) VALUES ((SELECT 1))", Dialect::Mssql)
                .unwrap();
        let columns = FinalOutputVisitor::collect(statement_query(&statements[0]).unwrap());
        assert!(columns.is_empty());
    }
}
