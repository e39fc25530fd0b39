mod common;

use common::{analyze_default, qualified_names};
use queryscope_core::{analyze, AnalysisOptions, SubQueryType, TableType};

#[test]
fn test_alias_shadowing_in_subquery() {
    let result = analyze_default(
        "SELECT a.id FROM t1 AS a \
         WHERE EXISTS (SELECT 1 FROM t2 AS a WHERE a.id = 10) AND a.id = 20",
    );

    // The outer `a` must resolve to t1, not to the t2 inside EXISTS.
    let t1 = result.tables.iter().find(|t| t.name == "t1").unwrap();
    let t2 = result.tables.iter().find(|t| t.name == "t2").unwrap();
    assert!(t1.direct_reference);
    assert!(!t2.direct_reference);
    assert_eq!(qualified_names(&t1.select_columns), vec!["a.id"]);
    assert_eq!(qualified_names(&t1.predicate_columns), vec!["a.id"]);
    assert!(t2.predicate_columns.is_empty());

    let exists = result.subqueries[0].inner_analysis.as_deref().unwrap();
    assert_eq!(exists.tables.len(), 1);
    assert_eq!(exists.tables[0].name, "t2");
    assert_eq!(qualified_names(&exists.tables[0].predicate_columns), vec!["a.id"]);
}

#[test]
fn test_nested_columns_only_in_nested_results() {
    let result = analyze_default(
        "SELECT c.name FROM Customers c \
         WHERE c.id IN (SELECT o.customer_id FROM Orders o WHERE o.total > 100)",
    );
    assert_eq!(qualified_names(&result.select_columns), vec!["c.name"]);
    assert_eq!(qualified_names(&result.predicate_columns), vec!["c.id"]);

    let inner = result.subqueries[0].inner_analysis.as_deref().unwrap();
    assert_eq!(qualified_names(&inner.select_columns), vec!["o.customer_id"]);
    assert_eq!(qualified_names(&inner.predicate_columns), vec!["o.total"]);
}

#[test]
fn test_derived_table_placeholder() {
    let result = analyze_default(
        "SELECT s.total FROM (SELECT SUM(o.amount) AS total FROM Orders o) s",
    );
    let placeholder = &result.tables[0];
    assert_eq!(placeholder.table_type, TableType::DerivedTable);
    assert_eq!(placeholder.alias.as_deref(), Some("s"));
    assert!(placeholder.direct_reference);
    assert_eq!(qualified_names(&placeholder.select_columns), vec!["s.total"]);

    let orders = &result.tables[1];
    assert_eq!(orders.name, "Orders");
    assert!(!orders.direct_reference);

    assert_eq!(result.subqueries[0].subquery_type, SubQueryType::DerivedTable);
}

#[test]
fn test_deeply_nested_subqueries_each_recorded_once() {
    let result = analyze_default(
        "SELECT a.x FROM A a WHERE a.x IN \
         (SELECT b.x FROM B b WHERE b.y IN (SELECT c.y FROM C c WHERE c.z IN (SELECT d.z FROM D d)))",
    );
    let mut depth = 0;
    let mut level = &result;
    while let Some(next) = level.subqueries.first() {
        assert_eq!(level.subqueries.len(), 1);
        level = next.inner_analysis.as_deref().unwrap();
        depth += 1;
    }
    assert_eq!(depth, 3);
    assert_eq!(level.tables[0].name, "D");
}

#[test]
fn test_cte_reference_clears_schema() {
    let result = analyze_default(
        "WITH Recent AS (SELECT id FROM dbo.Orders) SELECT r.id FROM Recent r",
    );
    let recent = &result.tables[0];
    assert_eq!(recent.table_type, TableType::Cte);
    assert!(recent.schema.is_none());
    assert!(result.schemas().is_empty());

    let inner = result.ctes[0].inner_analysis.as_deref().unwrap();
    assert_eq!(inner.schemas(), vec!["dbo"]);
}

#[test]
fn test_information_schema_is_view() {
    let result = analyze_default("SELECT t.TABLE_NAME FROM INFORMATION_SCHEMA.TABLES t");
    assert_eq!(result.tables[0].table_type, TableType::View);
}

#[test]
fn test_nested_disabled_still_records_fragments() {
    let options = AnalysisOptions {
        analyze_nested_queries: false,
        ..AnalysisOptions::default()
    };
    let result = analyze(
        "WITH T AS (SELECT 1 AS one) SELECT t.one FROM T t WHERE EXISTS (SELECT 1 FROM U)",
        &options,
    )
    .unwrap();
    assert_eq!(result.ctes.len(), 1);
    assert_eq!(result.subqueries.len(), 1);
    assert!(result.ctes[0].inner_analysis.is_none());
    assert!(result.subqueries[0].inner_analysis.is_none());
}
