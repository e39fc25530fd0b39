//! Output-column lineage: for each SELECT item of a level, the base columns that feed it
//! and the kind of transformation applied.

use super::columns::{ColumnMentions, STAR_COLUMN};
use super::correlate::resolve_table;
use super::functions::{function_base_name, is_aggregate, is_cast, is_conditional};
use super::visitor::{walk_query, walk_set_expr, Visitor};
use crate::types::{
    ColumnLineage, ColumnReference, ColumnUsage, SourceColumn, TableReference,
    TransformationType,
};
use sqlparser::ast::{
    Cte, Expr, Ident, Query, Select, SelectItem, SelectItemQualifiedWildcardKind, SetExpr,
};

pub(crate) struct LineageBuilder<'t> {
    tables: &'t [TableReference],
    entries: Vec<ColumnLineage>,
}

impl<'t> LineageBuilder<'t> {
    pub(crate) fn build(query: &Query, tables: &'t [TableReference]) -> Vec<ColumnLineage> {
        let mut builder = Self {
            tables,
            entries: Vec::new(),
        };
        walk_query(&mut builder, query);
        builder.entries
    }

    /// The table an unqualified column is attributed to: the only direct table, if
    /// there is exactly one.
    fn sole_direct_table(&self) -> Option<&'t TableReference> {
        let mut direct = self.tables.iter().filter(|table| table.direct_reference);
        match (direct.next(), direct.next()) {
            (Some(table), None) => Some(table),
            _ => None,
        }
    }

    /// `depth` is the number of nested queries around the mention; unqualified
    /// columns inside a nested query are not attributed to this level's tables.
    fn source_column(&self, column: ColumnReference, depth: usize) -> SourceColumn {
        let table = match column.source_identifier() {
            Some(qualifier) => resolve_table(self.tables, qualifier),
            None if depth == 0 => self.sole_direct_table(),
            None => None,
        };
        match table {
            Some(table) => SourceColumn {
                database: table.database.clone(),
                schema: table.schema.clone().or(column.schema),
                table_name: Some(table.name.clone()),
                table_alias: table.alias.clone(),
                column_name: column.column_name,
            },
            None => SourceColumn {
                database: None,
                schema: column.schema,
                table_name: column.table_name,
                table_alias: column.table_alias,
                column_name: column.column_name,
            },
        }
    }

    fn table_star(table: &TableReference) -> SourceColumn {
        SourceColumn {
            database: table.database.clone(),
            schema: table.schema.clone(),
            table_name: Some(table.name.clone()),
            table_alias: table.alias.clone(),
            column_name: STAR_COLUMN.to_string(),
        }
    }

    fn star_entry(&mut self, qualifier: Option<String>, expression: String) {
        let source_columns = match &qualifier {
            Some(qualifier) => match resolve_table(self.tables, qualifier) {
                Some(table) => vec![Self::table_star(table)],
                None => vec![SourceColumn {
                    database: None,
                    schema: None,
                    table_name: None,
                    table_alias: Some(qualifier.clone()),
                    column_name: STAR_COLUMN.to_string(),
                }],
            },
            None => self
                .tables
                .iter()
                .filter(|table| table.direct_reference)
                .map(Self::table_star)
                .collect(),
        };
        self.entries.push(ColumnLineage {
            output_column: STAR_COLUMN.to_string(),
            output_alias: None,
            source_columns,
            is_computed: false,
            expression,
            transformation: TransformationType::Direct,
        });
    }

    fn expression_entry(&mut self, expr: &Expr, alias: Option<&Ident>) {
        let transformation = classify_transformation(expr);
        let source_columns = ColumnMentions::collect_all(expr, ColumnUsage::Select)
            .into_iter()
            .map(|(column, depth)| self.source_column(column, depth))
            .collect();
        self.entries.push(ColumnLineage {
            output_column: alias
                .map(|ident| ident.value.clone())
                .unwrap_or_else(|| derived_output_name(expr)),
            output_alias: alias.map(|ident| ident.value.clone()),
            source_columns,
            is_computed: transformation.is_computed(),
            expression: expr.to_string(),
            transformation,
        });
    }
}

impl Visitor for LineageBuilder<'_> {
    fn visit_query(&mut self, _query: &Query) {}

    fn visit_cte(&mut self, _cte: &Cte) {}

    fn visit_set_expr(&mut self, set_expr: &SetExpr) {
        match set_expr {
            SetExpr::Query(query) => walk_query(self, query),
            other => walk_set_expr(self, other),
        }
    }

    fn visit_select(&mut self, select: &Select) {
        for item in &select.projection {
            self.visit_select_item(item);
        }
    }

    fn visit_select_item(&mut self, item: &SelectItem) {
        match item {
            SelectItem::UnnamedExpr(expr) => self.expression_entry(expr, None),
            SelectItem::ExprWithAlias { expr, alias } => self.expression_entry(expr, Some(alias)),
            SelectItem::Wildcard(_) => self.star_entry(None, item.to_string()),
            SelectItem::QualifiedWildcard(kind, _) => {
                let qualifier = match kind {
                    SelectItemQualifiedWildcardKind::ObjectName(name) => name
                        .0
                        .last()
                        .and_then(|part| part.as_ident())
                        .map(|ident| ident.value.clone()),
                    SelectItemQualifiedWildcardKind::Expr(expr) => Some(expr.to_string()),
                };
                self.star_entry(qualifier, item.to_string());
            }
        }
    }

    fn visit_expr(&mut self, _expr: &Expr) {}
}

/// How an expression transforms its inputs, decided by its shape.
pub(crate) fn classify_transformation(expr: &Expr) -> TransformationType {
    match expr {
        Expr::Identifier(_) | Expr::CompoundIdentifier(_) => TransformationType::Direct,
        Expr::Nested(inner) => classify_transformation(inner),
        Expr::Cast { .. } | Expr::Convert { .. } => TransformationType::Cast,
        Expr::Function(function) => {
            let name = function_base_name(&function.name);
            if is_cast(&name) {
                TransformationType::Cast
            } else if is_aggregate(&name) {
                TransformationType::Aggregate
            } else if is_conditional(&name) {
                TransformationType::Case
            } else {
                TransformationType::Function
            }
        }
        Expr::Extract { .. }
        | Expr::Ceil { .. }
        | Expr::Floor { .. }
        | Expr::Substring { .. }
        | Expr::Trim { .. }
        | Expr::Position { .. }
        | Expr::AtTimeZone { .. } => TransformationType::Function,
        Expr::Case { .. } => TransformationType::Case,
        Expr::BinaryOp { .. } | Expr::UnaryOp { .. } => TransformationType::Arithmetic,
        Expr::Value(_) | Expr::TypedString { .. } | Expr::Interval(_) => TransformationType::Literal,
        Expr::Subquery(_) => TransformationType::Subquery,
        _ => TransformationType::Unknown,
    }
}

/// Name of an unaliased output column, derived from the expression shape.
pub(crate) fn derived_output_name(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(ident) => ident.value.clone(),
        Expr::CompoundIdentifier(parts) => parts
            .last()
            .map(|ident| ident.value.clone())
            .unwrap_or_default(),
        Expr::Nested(inner) => derived_output_name(inner),
        Expr::Function(function) => function
            .name
            .0
            .last()
            .and_then(|part| part.as_ident())
            .map(|ident| ident.value.clone())
            .unwrap_or_else(|| function.name.to_string()),
        Expr::Cast { .. } => "CAST".to_string(),
        Expr::Convert { .. } => "CONVERT".to_string(),
        Expr::Case { .. } => "[Case]".to_string(),
        Expr::Subquery(_) => "[Subquery]".to_string(),
        Expr::Value(_) | Expr::TypedString { .. } => "[Literal]".to_string(),
        _ => "[Expression]".to_string(),
    }
}
