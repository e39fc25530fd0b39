//! Correlation of columns with their tables, and structural deduplication.

use crate::types::{
    AnalysisResult, ColumnLineage, ColumnReference, ColumnUsage, JoinType, TableReference,
    TableType, TransformationType,
};
use std::collections::HashSet;
use std::hash::Hash;

/// Finds the table a qualifier refers to.
///
/// An exact alias match wins, then a case-insensitive match on alias or name. Among
/// equal candidates a direct reference is preferred over one inside a nested scope.
pub(crate) fn resolve_table<'t>(
    tables: &'t [TableReference],
    qualifier: &str,
) -> Option<&'t TableReference> {
    resolve_index(tables, qualifier).map(|index| &tables[index])
}

fn resolve_index(tables: &[TableReference], qualifier: &str) -> Option<usize> {
    let best = |matches: &dyn Fn(&TableReference) -> bool| {
        tables
            .iter()
            .enumerate()
            .filter(|(_, table)| matches(table))
            .min_by_key(|(_, table)| !table.direct_reference)
            .map(|(index, _)| index)
    };
    best(&|table| table.alias.as_deref() == Some(qualifier))
        .or_else(|| best(&|table| table.reference_identifier().eq_ignore_ascii_case(qualifier)))
        .or_else(|| best(&|table| table.name.eq_ignore_ascii_case(qualifier)))
}

/// Appends every select, join and predicate column that names a known table to that
/// table's own list. Columns that resolve to nothing stay unlinked.
pub(crate) fn correlate(result: &mut AnalysisResult) {
    let AnalysisResult {
        tables,
        select_columns,
        join_columns,
        predicate_columns,
        ..
    } = result;
    for column in select_columns.iter() {
        if let Some(index) = owner(tables, column) {
            tables[index].select_columns.push(column.clone());
        }
    }
    for column in join_columns.iter() {
        if let Some(index) = owner(tables, column) {
            tables[index].join_columns.push(column.clone());
        }
    }
    for column in predicate_columns.iter() {
        if let Some(index) = owner(tables, column) {
            tables[index].predicate_columns.push(column.clone());
        }
    }
}

fn owner(tables: &[TableReference], column: &ColumnReference) -> Option<usize> {
    column
        .source_identifier()
        .and_then(|qualifier| resolve_index(tables, qualifier))
}

fn fold(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|s| s.to_lowercase())
}

type ColumnKey = (
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
    ColumnUsage,
    bool,
);

fn column_key(column: &ColumnReference) -> ColumnKey {
    (
        fold(&column.table_alias),
        fold(&column.table_name),
        fold(&column.schema),
        column.column_name.to_lowercase(),
        fold(&column.alias),
        fold(&column.expression),
        column.usage,
        column.ascending,
    )
}

type TableKey = (
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    TableType,
    Option<JoinType>,
    bool,
);

fn table_key(table: &TableReference) -> TableKey {
    (
        fold(&table.database),
        fold(&table.schema),
        table.name.to_lowercase(),
        fold(&table.alias),
        table.table_type,
        table.join_type,
        table.direct_reference,
    )
}

fn lineage_key(lineage: &ColumnLineage) -> (String, Option<String>, String, TransformationType, String) {
    let mut signature: Vec<String> = lineage
        .source_columns
        .iter()
        .map(|source| source.signature().to_lowercase())
        .collect();
    signature.sort();
    (
        lineage.output_column.to_lowercase(),
        fold(&lineage.output_alias),
        lineage.expression.to_lowercase(),
        lineage.transformation,
        signature.join(","),
    )
}

/// Keeps the first of each group of items with equal keys, preserving order.
fn dedup_by_key<T, K: Eq + Hash>(items: &mut Vec<T>, key: impl Fn(&T) -> K) {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(key(item)));
}

impl AnalysisResult {
    /// Collapses structurally equal entries in every list of this result.
    ///
    /// Strings compare case-insensitively. The first occurrence is kept, so running
    /// this on an already deduplicated result changes nothing. CTE and subquery lists
    /// are left as they are: each entry carries its own nested analysis.
    pub fn deduplicate(&mut self) {
        dedup_by_key(&mut self.tables, table_key);
        for table in &mut self.tables {
            dedup_by_key(&mut table.select_columns, column_key);
            dedup_by_key(&mut table.join_columns, column_key);
            dedup_by_key(&mut table.predicate_columns, column_key);
        }
        dedup_by_key(&mut self.select_columns, column_key);
        dedup_by_key(&mut self.predicate_columns, column_key);
        dedup_by_key(&mut self.join_columns, column_key);
        dedup_by_key(&mut self.group_by_columns, column_key);
        dedup_by_key(&mut self.order_by_columns, column_key);
        dedup_by_key(&mut self.final_output_columns, column_key);
        dedup_by_key(&mut self.column_lineage, lineage_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, alias: Option<&str>, direct: bool) -> TableReference {
        let mut table = TableReference::new(name, TableType::Table);
        table.alias = alias.map(str::to_string);
        table.direct_reference = direct;
        table
    }

    fn column(alias: Option<&str>, name: &str, usage: ColumnUsage) -> ColumnReference {
        let mut column = ColumnReference::new(name, usage);
        column.table_alias = alias.map(str::to_string);
        column
    }

    #[test]
    fn test_resolve_prefers_alias_then_name_then_direct() {
        let tables = vec![
            table("Orders", Some("o"), false),
            table("Orders", Some("o"), true),
            table("Products", None, true),
        ];
        let resolved = resolve_table(&tables, "o").unwrap();
        assert!(resolved.direct_reference);
        assert_eq!(resolve_table(&tables, "PRODUCTS").unwrap().name, "Products");
        assert_eq!(resolve_table(&tables, "O").unwrap().alias.as_deref(), Some("o"));
        assert!(resolve_table(&tables, "x").is_none());
    }

    #[test]
    fn test_correlate_attaches_columns() {
        let mut result = AnalysisResult::new("");
        result.tables = vec![table("Products", Some("p"), true), table("Categories", Some("c"), true)];
        result.join_columns = vec![
            column(Some("p"), "category_id", ColumnUsage::Join),
            column(Some("c"), "category_id", ColumnUsage::Join),
        ];
        result.select_columns = vec![
            column(Some("p"), "id", ColumnUsage::Select),
            column(None, "name", ColumnUsage::Select),
            column(Some("zz"), "oops", ColumnUsage::Select),
        ];
        result.predicate_columns = vec![column(Some("c"), "active", ColumnUsage::Where)];

        correlate(&mut result);

        let products = &result.tables[0];
        assert_eq!(products.join_columns.len(), 1);
        assert_eq!(products.join_columns[0].column_name, "category_id");
        assert_eq!(products.select_columns.len(), 1);
        assert_eq!(result.tables[1].predicate_columns.len(), 1);
        assert_eq!(result.tables[1].join_columns[0].table_alias.as_deref(), Some("c"));
    }

    #[test]
    fn test_dedup_case_insensitive_and_stable() {
        let mut result = AnalysisResult::new("");
        result.select_columns = vec![
            column(Some("p"), "Id", ColumnUsage::Select),
            column(Some("P"), "id", ColumnUsage::Select),
            column(Some("p"), "id", ColumnUsage::OrderBy),
        ];
        let mut descending = column(Some("p"), "id", ColumnUsage::OrderBy);
        descending.ascending = false;
        result.order_by_columns = vec![
            column(Some("p"), "id", ColumnUsage::OrderBy),
            descending,
        ];
        result.deduplicate();
        assert_eq!(result.select_columns.len(), 2);
        assert_eq!(result.select_columns[0].column_name, "Id");
        assert_eq!(result.order_by_columns.len(), 2);

        let once = result.clone();
        result.deduplicate();
        assert_eq!(result, once);
    }

    #[test]
    fn test_table_dedup_respects_direct_flag_and_join() {
        let mut joined = table("Orders", Some("o"), true);
        joined.join_type = Some(JoinType::Left);
        let mut result = AnalysisResult::new("");
        result.tables = vec![
            table("Orders", Some("o"), true),
            table("orders", Some("O"), true),
            table("Orders", Some("o"), false),
            joined,
        ];
        result.deduplicate();
        assert_eq!(result.tables.len(), 3);
    }

    #[test]
    fn test_lineage_dedup_ignores_source_order() {
        use crate::types::SourceColumn;
        let source = |alias: &str, col: &str| SourceColumn {
            database: None,
            schema: None,
            table_name: None,
            table_alias: Some(alias.to_string()),
            column_name: col.to_string(),
        };
        let entry = |sources: Vec<SourceColumn>| ColumnLineage {
            output_column: "total".into(),
            output_alias: Some("total".into()),
            source_columns: sources,
            is_computed: true,
            expression: "a.x + b.y".into(),
            transformation: TransformationType::Arithmetic,
        };
        let mut result = AnalysisResult::new("");
        result.column_lineage = vec![
            entry(vec![source("a", "x"), source("b", "y")]),
            entry(vec![source("b", "y"), source("a", "x")]),
        ];
        result.deduplicate();
        assert_eq!(result.column_lineage.len(), 1);
    }
}
