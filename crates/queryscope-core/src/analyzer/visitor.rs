//! Visitor pattern for AST traversal.
//!
//! Every `visit_*` method defaults to the matching `walk_*` function, which visits the
//! node's children. A pass overrides the hooks it cares about and calls `walk_*` from
//! the override when it wants traversal to continue below that node.
//!
//! The walkers never descend into anything on their own terms: nested queries reached
//! from expressions go through [`Visitor::visit_query`], so a pass that must stop at a
//! scope boundary overrides `visit_expr` or `visit_table_factor` and simply does not walk.

use super::functions::{function_base_name, is_date_part_arg};
use sqlparser::ast::{
    AccessExpr, Cte, Expr, Function, FunctionArg, FunctionArgExpr, FunctionArgumentClause,
    FunctionArguments, Join, JoinConstraint, JoinOperator, OrderByExpr, OrderByKind, Query,
    Select, SelectItem, SelectItemQualifiedWildcardKind, SetExpr, Statement, Subscript,
    TableFactor, TableWithJoins, WindowType,
};

pub(crate) trait Visitor {
    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement);
    }

    fn visit_query(&mut self, query: &Query) {
        walk_query(self, query);
    }

    fn visit_cte(&mut self, cte: &Cte) {
        self.visit_query(&cte.query);
    }

    fn visit_set_expr(&mut self, set_expr: &SetExpr) {
        walk_set_expr(self, set_expr);
    }

    fn visit_select(&mut self, select: &Select) {
        walk_select(self, select);
    }

    fn visit_select_item(&mut self, item: &SelectItem) {
        walk_select_item(self, item);
    }

    fn visit_table_with_joins(&mut self, table: &TableWithJoins) {
        walk_table_with_joins(self, table);
    }

    fn visit_table_factor(&mut self, table: &TableFactor) {
        walk_table_factor(self, table);
    }

    fn visit_join(&mut self, join: &Join) {
        walk_join(self, join);
    }

    fn visit_join_constraint(&mut self, constraint: &JoinConstraint) {
        if let JoinConstraint::On(expr) = constraint {
            self.visit_expr(expr);
        }
    }

    fn visit_where(&mut self, expr: &Expr) {
        self.visit_expr(expr);
    }

    fn visit_having(&mut self, expr: &Expr) {
        self.visit_expr(expr);
    }

    fn visit_group_by_expr(&mut self, expr: &Expr) {
        self.visit_expr(expr);
    }

    fn visit_order_by_expr(&mut self, order_by: &OrderByExpr) {
        self.visit_expr(&order_by.expr);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

pub(crate) fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, statement: &Statement) {
    if let Some(query) = crate::parser::statement_query(statement) {
        visitor.visit_query(query);
    }
}

pub(crate) fn walk_query<V: Visitor + ?Sized>(visitor: &mut V, query: &Query) {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            visitor.visit_cte(cte);
        }
    }
    visitor.visit_set_expr(&query.body);
    if let Some(order_by) = &query.order_by {
        if let OrderByKind::Expressions(exprs) = &order_by.kind {
            for order_by_expr in exprs {
                visitor.visit_order_by_expr(order_by_expr);
            }
        }
    }
}

pub(crate) fn walk_set_expr<V: Visitor + ?Sized>(visitor: &mut V, set_expr: &SetExpr) {
    match set_expr {
        SetExpr::Select(select) => visitor.visit_select(select),
        SetExpr::Query(query) => visitor.visit_query(query),
        SetExpr::SetOperation { left, right, .. } => {
            visitor.visit_set_expr(left);
            visitor.visit_set_expr(right);
        }
        SetExpr::Values(values) => {
            for row in &values.rows {
                for expr in row {
                    visitor.visit_expr(expr);
                }
            }
        }
        SetExpr::Insert(statement) => visitor.visit_statement(statement),
        _ => {}
    }
}

pub(crate) fn walk_select<V: Visitor + ?Sized>(visitor: &mut V, select: &Select) {
    for item in &select.projection {
        visitor.visit_select_item(item);
    }
    for table in &select.from {
        visitor.visit_table_with_joins(table);
    }
    if let Some(selection) = &select.selection {
        visitor.visit_where(selection);
    }
    if let sqlparser::ast::GroupByExpr::Expressions(exprs, _) = &select.group_by {
        for expr in exprs {
            visitor.visit_group_by_expr(expr);
        }
    }
    if let Some(having) = &select.having {
        visitor.visit_having(having);
    }
    if let Some(qualify) = &select.qualify {
        visitor.visit_expr(qualify);
    }
}

pub(crate) fn walk_select_item<V: Visitor + ?Sized>(visitor: &mut V, item: &SelectItem) {
    match item {
        SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
            visitor.visit_expr(expr)
        }
        SelectItem::QualifiedWildcard(SelectItemQualifiedWildcardKind::Expr(expr), _) => {
            visitor.visit_expr(expr)
        }
        _ => {}
    }
}

pub(crate) fn walk_table_with_joins<V: Visitor + ?Sized>(visitor: &mut V, table: &TableWithJoins) {
    visitor.visit_table_factor(&table.relation);
    for join in &table.joins {
        visitor.visit_join(join);
    }
}

pub(crate) fn walk_join<V: Visitor + ?Sized>(visitor: &mut V, join: &Join) {
    visitor.visit_table_factor(&join.relation);
    if let Some(constraint) = join_constraint(&join.join_operator) {
        visitor.visit_join_constraint(constraint);
    }
}

pub(crate) fn walk_table_factor<V: Visitor + ?Sized>(visitor: &mut V, table: &TableFactor) {
    match table {
        TableFactor::Derived { subquery, .. } => visitor.visit_query(subquery),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => visitor.visit_table_with_joins(table_with_joins),
        TableFactor::Pivot { table, .. }
        | TableFactor::Unpivot { table, .. }
        | TableFactor::MatchRecognize { table, .. } => visitor.visit_table_factor(table),
        _ => {}
    }
}

/// The constraint attached to a join operator, if the operator carries one.
pub(crate) fn join_constraint(op: &JoinOperator) -> Option<&JoinConstraint> {
    match op {
        JoinOperator::Join(c)
        | JoinOperator::Inner(c)
        | JoinOperator::Left(c)
        | JoinOperator::LeftOuter(c)
        | JoinOperator::Right(c)
        | JoinOperator::RightOuter(c)
        | JoinOperator::FullOuter(c)
        | JoinOperator::CrossJoin(c)
        | JoinOperator::Semi(c)
        | JoinOperator::LeftSemi(c)
        | JoinOperator::RightSemi(c)
        | JoinOperator::Anti(c)
        | JoinOperator::LeftAnti(c)
        | JoinOperator::RightAnti(c)
        | JoinOperator::StraightJoin(c) => Some(c),
        JoinOperator::AsOf { constraint, .. } => Some(constraint),
        JoinOperator::CrossApply | JoinOperator::OuterApply => None,
    }
}

pub(crate) fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match expr {
        Expr::BinaryOp { left, right, .. }
        | Expr::AnyOp { left, right, .. }
        | Expr::AllOp { left, right, .. }
        | Expr::IsDistinctFrom(left, right)
        | Expr::IsNotDistinctFrom(left, right) => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        Expr::UnaryOp { expr: inner, .. }
        | Expr::Nested(inner)
        | Expr::Cast { expr: inner, .. }
        | Expr::Convert { expr: inner, .. }
        | Expr::Extract { expr: inner, .. }
        | Expr::Ceil { expr: inner, .. }
        | Expr::Floor { expr: inner, .. }
        | Expr::Collate { expr: inner, .. }
        | Expr::IsNull(inner)
        | Expr::IsNotNull(inner)
        | Expr::IsTrue(inner)
        | Expr::IsNotTrue(inner)
        | Expr::IsFalse(inner)
        | Expr::IsNotFalse(inner)
        | Expr::IsUnknown(inner)
        | Expr::IsNotUnknown(inner) => visitor.visit_expr(inner),
        Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => {
            if let Some(operand) = operand {
                visitor.visit_expr(operand);
            }
            for case_when in conditions {
                visitor.visit_expr(&case_when.condition);
                visitor.visit_expr(&case_when.result);
            }
            if let Some(else_result) = else_result {
                visitor.visit_expr(else_result);
            }
        }
        Expr::Function(function) => walk_function(visitor, function),
        Expr::InSubquery { expr, subquery, .. } => {
            visitor.visit_expr(expr);
            visitor.visit_query(subquery);
        }
        Expr::Subquery(subquery) | Expr::Exists { subquery, .. } => visitor.visit_query(subquery),
        Expr::Between {
            expr, low, high, ..
        } => {
            visitor.visit_expr(expr);
            visitor.visit_expr(low);
            visitor.visit_expr(high);
        }
        Expr::InList { expr, list, .. } => {
            visitor.visit_expr(expr);
            for item in list {
                visitor.visit_expr(item);
            }
        }
        Expr::Like { expr, pattern, .. }
        | Expr::ILike { expr, pattern, .. }
        | Expr::SimilarTo { expr, pattern, .. }
        | Expr::RLike { expr, pattern, .. } => {
            visitor.visit_expr(expr);
            visitor.visit_expr(pattern);
        }
        Expr::Tuple(items) => {
            for item in items {
                visitor.visit_expr(item);
            }
        }
        Expr::Substring {
            expr,
            substring_from,
            substring_for,
            ..
        } => {
            visitor.visit_expr(expr);
            if let Some(from) = substring_from {
                visitor.visit_expr(from);
            }
            if let Some(length) = substring_for {
                visitor.visit_expr(length);
            }
        }
        Expr::Trim {
            expr, trim_what, ..
        } => {
            visitor.visit_expr(expr);
            if let Some(what) = trim_what {
                visitor.visit_expr(what);
            }
        }
        Expr::Position { expr, r#in } => {
            visitor.visit_expr(expr);
            visitor.visit_expr(r#in);
        }
        Expr::AtTimeZone {
            timestamp,
            time_zone,
        } => {
            visitor.visit_expr(timestamp);
            visitor.visit_expr(time_zone);
        }
        Expr::Interval(interval) => visitor.visit_expr(&interval.value),
        Expr::Rollup(sets) | Expr::Cube(sets) | Expr::GroupingSets(sets) => {
            for set in sets {
                for item in set {
                    visitor.visit_expr(item);
                }
            }
        }
        Expr::Array(array) => {
            for item in &array.elem {
                visitor.visit_expr(item);
            }
        }
        Expr::Struct { values, .. } => {
            for value in values {
                visitor.visit_expr(value);
            }
        }
        Expr::Named { expr, .. } => visitor.visit_expr(expr),
        Expr::InUnnest {
            expr, array_expr, ..
        } => {
            visitor.visit_expr(expr);
            visitor.visit_expr(array_expr);
        }
        Expr::Overlay {
            expr,
            overlay_what,
            overlay_from,
            overlay_for,
        } => {
            visitor.visit_expr(expr);
            visitor.visit_expr(overlay_what);
            visitor.visit_expr(overlay_from);
            if let Some(length) = overlay_for {
                visitor.visit_expr(length);
            }
        }
        // Dot segments name fields, not columns; only the root and subscripts are walked.
        Expr::CompoundFieldAccess { root, access_chain } => {
            visitor.visit_expr(root);
            for access in access_chain {
                match access {
                    AccessExpr::Subscript(Subscript::Index { index }) => visitor.visit_expr(index),
                    AccessExpr::Subscript(Subscript::Slice {
                        lower_bound,
                        upper_bound,
                        stride,
                    }) => {
                        for bound in [lower_bound, upper_bound, stride].into_iter().flatten() {
                            visitor.visit_expr(bound);
                        }
                    }
                    AccessExpr::Dot(_) => {}
                }
            }
        }
        _ => {}
    }
}

/// Visits arguments, FILTER, WITHIN GROUP and the window spec of a function call.
///
/// Date-part keywords (`day` in `DATEDIFF(day, a, b)`) are skipped: they parse as
/// identifiers but never name a column.
pub(crate) fn walk_function<V: Visitor + ?Sized>(visitor: &mut V, function: &Function) {
    let name = function_base_name(&function.name);
    match &function.args {
        FunctionArguments::Subquery(query) => visitor.visit_query(query),
        FunctionArguments::List(list) => {
            for (index, arg) in list.args.iter().enumerate() {
                let expr = match arg {
                    FunctionArg::Unnamed(FunctionArgExpr::Expr(expr))
                    | FunctionArg::Named {
                        arg: FunctionArgExpr::Expr(expr),
                        ..
                    }
                    | FunctionArg::ExprNamed {
                        arg: FunctionArgExpr::Expr(expr),
                        ..
                    } => expr,
                    _ => continue,
                };
                if matches!(expr, Expr::Identifier(_)) && is_date_part_arg(&name, index) {
                    continue;
                }
                visitor.visit_expr(expr);
            }
            for clause in &list.clauses {
                if let FunctionArgumentClause::OrderBy(order_by) = clause {
                    for order_by_expr in order_by {
                        visitor.visit_expr(&order_by_expr.expr);
                    }
                }
            }
        }
        FunctionArguments::None => {}
    }
    if let Some(filter) = &function.filter {
        visitor.visit_expr(filter);
    }
    for order_by_expr in &function.within_group {
        visitor.visit_expr(&order_by_expr.expr);
    }
    if let Some(WindowType::WindowSpec(spec)) = &function.over {
        for expr in &spec.partition_by {
            visitor.visit_expr(expr);
        }
        for order_by_expr in &spec.order_by {
            visitor.visit_expr(&order_by_expr.expr);
        }
    }
}
