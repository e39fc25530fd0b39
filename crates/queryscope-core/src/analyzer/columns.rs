//! Column reference construction and expression classification.
//!
//! Everything here is pure: a syntax node goes in, a [`ColumnReference`] or a tag
//! comes out.

use super::functions::{function_base_name, is_aggregate};
use super::visitor::{walk_expr, walk_query, Visitor};
use crate::types::{ColumnReference, ColumnUsage, ExpressionKind};
use sqlparser::ast::{Expr, Ident, ObjectName, Query, SelectItem, SelectItemQualifiedWildcardKind};

/// Column name used when the number of name parts is not 1 to 4.
pub(crate) const UNKNOWN_COLUMN: &str = "[Unknown]";
/// Column name used for a computed item that mentions no column.
pub(crate) const EXPRESSION_COLUMN: &str = "[Expression]";
pub(crate) const STAR_COLUMN: &str = "*";

/// Builds a column reference from the dot-separated parts of a column name.
///
/// | parts | meaning                           |
/// |-------|-----------------------------------|
/// | 1     | `column`                          |
/// | 2     | `table_alias.column`              |
/// | 3     | `schema.table.column`             |
/// | 4     | `database.schema.table.column`, database dropped |
pub(crate) fn column_from_parts(parts: &[Ident], usage: ColumnUsage) -> ColumnReference {
    let value = |i: usize| Some(parts[i].value.clone());
    let mut column = ColumnReference::new(UNKNOWN_COLUMN, usage);
    match parts.len() {
        1 => column.column_name = parts[0].value.clone(),
        2 => {
            column.table_alias = value(0);
            column.column_name = parts[1].value.clone();
        }
        3 => {
            column.schema = value(0);
            column.table_name = value(1);
            column.column_name = parts[2].value.clone();
        }
        4 => {
            column.schema = value(1);
            column.table_name = value(2);
            column.column_name = parts[3].value.clone();
        }
        _ => {}
    }
    column
}

/// A column reference for a bare column mention, `None` for anything else.
pub(crate) fn column_from_expr(expr: &Expr, usage: ColumnUsage) -> Option<ColumnReference> {
    match expr {
        Expr::Identifier(ident) => Some(column_from_parts(std::slice::from_ref(ident), usage)),
        Expr::CompoundIdentifier(parts) => Some(column_from_parts(parts, usage)),
        _ => None,
    }
}

/// A column reference for a `USING (...)` entry or other object-name column.
pub(crate) fn column_from_object_name(name: &ObjectName, usage: ColumnUsage) -> ColumnReference {
    let parts: Vec<Ident> = name
        .0
        .iter()
        .filter_map(|part| part.as_ident().cloned())
        .collect();
    column_from_parts(&parts, usage)
}

/// Kind of an expression, decided by its node type alone.
pub(crate) fn classify_expression(expr: &Expr) -> ExpressionKind {
    match expr {
        Expr::Identifier(_) | Expr::CompoundIdentifier(_) => ExpressionKind::Column,
        Expr::Wildcard(_) | Expr::QualifiedWildcard(..) => ExpressionKind::Star,
        Expr::Nested(inner) => classify_expression(inner),
        Expr::Function(function) => {
            if is_aggregate(&function_base_name(&function.name)) {
                ExpressionKind::Aggregate
            } else {
                ExpressionKind::Function
            }
        }
        Expr::Cast { .. }
        | Expr::Convert { .. }
        | Expr::Extract { .. }
        | Expr::Ceil { .. }
        | Expr::Floor { .. }
        | Expr::Substring { .. }
        | Expr::Trim { .. }
        | Expr::Position { .. }
        | Expr::AtTimeZone { .. } => ExpressionKind::Function,
        Expr::Value(_) | Expr::TypedString { .. } | Expr::Interval(_) => ExpressionKind::Literal,
        Expr::Subquery(_) => ExpressionKind::Subquery,
        _ => ExpressionKind::Expression,
    }
}

/// Builds the single entry a SELECT-list item contributes.
///
/// Stars become `*` with kind [`ExpressionKind::Star`], carrying their qualifier as the
/// table alias. A computed item borrows the identity of the first column it mentions
/// (at most one nested query down) and keeps its full text and alias.
pub(crate) fn build_select_item(item: &SelectItem) -> ColumnReference {
    match item {
        SelectItem::UnnamedExpr(expr) => build_expression_column(expr, None, ColumnUsage::Select),
        SelectItem::ExprWithAlias { expr, alias } => {
            build_expression_column(expr, Some(alias), ColumnUsage::Select)
        }
        SelectItem::Wildcard(_) => star_column(None),
        SelectItem::QualifiedWildcard(kind, _) => {
            let qualifier = match kind {
                SelectItemQualifiedWildcardKind::ObjectName(name) => name
                    .0
                    .last()
                    .and_then(|part| part.as_ident())
                    .map(|ident| ident.value.clone()),
                SelectItemQualifiedWildcardKind::Expr(expr) => Some(expr.to_string()),
            };
            star_column(qualifier)
        }
    }
}

fn star_column(qualifier: Option<String>) -> ColumnReference {
    let mut column = ColumnReference::new(STAR_COLUMN, ColumnUsage::Select);
    column.table_alias = qualifier;
    column.expression_kind = ExpressionKind::Star;
    column
}

pub(crate) fn build_expression_column(
    expr: &Expr,
    alias: Option<&Ident>,
    usage: ColumnUsage,
) -> ColumnReference {
    let kind = classify_expression(expr);
    let mut column = match column_from_expr(expr, usage) {
        Some(column) => column,
        None => first_column_mention(expr, usage)
            .unwrap_or_else(|| ColumnReference::new(EXPRESSION_COLUMN, usage)),
    };
    column.alias = alias.map(|ident| ident.value.clone());
    column.expression_kind = kind;
    if kind != ExpressionKind::Column {
        column.expression = Some(expr.to_string());
    }
    column
}

/// Collects every column mentioned in an expression, in source order.
///
/// Nested queries are entered up to `query_levels` deep; mentions below that are
/// skipped. Each mention records how many nested queries enclose it.
#[derive(Debug)]
pub(crate) struct ColumnMentions {
    usage: ColumnUsage,
    query_levels: usize,
    depth: usize,
    mentions: Vec<(ColumnReference, usize)>,
}

impl ColumnMentions {
    /// Every mention in the subtree with its nesting depth, nested queries included.
    pub(crate) fn collect_all(expr: &Expr, usage: ColumnUsage) -> Vec<(ColumnReference, usize)> {
        Self::collect_within(expr, usage, usize::MAX)
    }

    fn collect_within(
        expr: &Expr,
        usage: ColumnUsage,
        query_levels: usize,
    ) -> Vec<(ColumnReference, usize)> {
        let mut collector = Self {
            usage,
            query_levels,
            depth: 0,
            mentions: Vec::new(),
        };
        collector.visit_expr(expr);
        collector.mentions
    }
}

impl Visitor for ColumnMentions {
    fn visit_query(&mut self, query: &Query) {
        if self.depth >= self.query_levels {
            return;
        }
        self.depth += 1;
        walk_query(self, query);
        self.depth -= 1;
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match column_from_expr(expr, self.usage) {
            Some(column) => self.mentions.push((column, self.depth)),
            None => walk_expr(self, expr),
        }
    }
}

/// The column a computed item is anchored to: its first mention, looking one query
/// level deep so a scalar subquery borrows its own projection's column.
pub(crate) fn first_column_mention(expr: &Expr, usage: ColumnUsage) -> Option<ColumnReference> {
    ColumnMentions::collect_within(expr, usage, 1)
        .into_iter()
        .next()
        .map(|(column, _)| column)
}
