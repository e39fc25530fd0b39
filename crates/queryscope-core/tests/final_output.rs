mod common;

use common::{analyze_default, output_names, qualified_names};
use queryscope_core::{ExpressionKind, TransformationType};
use rstest::rstest;

#[test]
fn test_select_star() {
    let result = analyze_default("SELECT * FROM Products p");
    assert_eq!(result.final_output_columns.len(), 1);
    let star = &result.final_output_columns[0];
    assert_eq!(star.expression_kind, ExpressionKind::Star);
    assert_eq!(star.column_name, "*");
    assert_eq!(star.table_alias, None);
}

#[test]
fn test_qualified_star() {
    let result = analyze_default(
        "SELECT p.* FROM Products p JOIN Categories c ON p.category_id = c.category_id",
    );
    assert_eq!(result.final_output_columns.len(), 1);
    assert_eq!(result.final_output_columns[0].expression_kind, ExpressionKind::Star);
    assert_eq!(result.final_output_columns[0].table_alias.as_deref(), Some("p"));

    let lineage = &result.column_lineage[0];
    assert_eq!(lineage.source_columns.len(), 1);
    assert_eq!(lineage.source_columns[0].table_name.as_deref(), Some("Products"));
}

#[test]
fn test_scalar_subquery_counts() {
    let result =
        analyze_default("SELECT p.id, (SELECT COUNT(*) FROM Orders) AS cnt FROM Products p");
    assert_eq!(qualified_names(&result.final_output_columns)[0], "p.id");
    assert_eq!(output_names(&result), vec!["id", "cnt"]);
    assert_eq!(
        result.final_output_columns[1].expression_kind,
        ExpressionKind::Subquery
    );
    assert!(result.total_select_column_count() > 2);
    assert_eq!(
        result.column_lineage[1].transformation,
        TransformationType::Subquery
    );
}

#[test]
fn test_cte_body_columns_not_returned() {
    let result = analyze_default(
        "WITH T AS (SELECT id, name, email FROM Users) SELECT t.id, t.name FROM T t",
    );
    assert_eq!(qualified_names(&result.final_output_columns), vec!["t.id", "t.name"]);
    assert!(result
        .final_output_columns
        .iter()
        .all(|c| c.column_name != "email"));
    let inner = result.ctes[0].inner_analysis.as_deref().unwrap();
    assert_eq!(inner.select_columns.len(), 3);
}

#[test]
fn test_derived_table_columns_not_returned() {
    let result = analyze_default(
        "SELECT d.total FROM (SELECT customer_id, SUM(amount) AS total FROM Orders GROUP BY customer_id) d",
    );
    assert_eq!(qualified_names(&result.final_output_columns), vec!["d.total"]);
    assert_eq!(qualified_names(&result.select_columns), vec!["d.total"]);
    assert!(result.group_by_columns.is_empty());
}

#[rstest]
#[case("SELECT a FROM t1 UNION SELECT b FROM t2", &["a"])]
#[case("SELECT a, b FROM t1 INTERSECT SELECT c, d FROM t2", &["a", "b"])]
#[case("SELECT x AS first_col FROM t1 EXCEPT SELECT y FROM t2 UNION ALL SELECT z FROM t3", &["first_col"])]
#[case("(SELECT a FROM t1) UNION (SELECT b FROM t2)", &["a"])]
fn test_set_operations_use_left_operand(#[case] sql: &str, #[case] expected: &[&str]) {
    let result = analyze_default(sql);
    assert_eq!(output_names(&result), expected);
}

#[rstest]
#[case("SELECT UPPER(c.name) FROM Customers c", ExpressionKind::Function, Some("c"))]
#[case("SELECT SUM(o.amount) AS total FROM Orders o", ExpressionKind::Aggregate, Some("o"))]
#[case("SELECT 42 AS answer", ExpressionKind::Literal, None)]
#[case("SELECT o.qty * o.price AS line FROM Orders o", ExpressionKind::Expression, Some("o"))]
#[case("SELECT CASE WHEN x.a > 1 THEN 1 ELSE 0 END AS f FROM X x", ExpressionKind::Expression, Some("x"))]
fn test_computed_items_borrow_first_column(
    #[case] sql: &str,
    #[case] kind: ExpressionKind,
    #[case] alias: Option<&str>,
) {
    let result = analyze_default(sql);
    assert_eq!(result.final_output_columns.len(), 1);
    let column = &result.final_output_columns[0];
    assert_eq!(column.expression_kind, kind);
    assert_eq!(column.table_alias.as_deref(), alias);
    assert!(column.expression.is_some());
}

#[test]
fn test_expression_text_and_alias_preserved() {
    let result = analyze_default("SELECT COALESCE(p.discount, 0) AS discount FROM Products p");
    let column = &result.final_output_columns[0];
    assert_eq!(column.alias.as_deref(), Some("discount"));
    assert_eq!(column.expression.as_deref(), Some("COALESCE(p.discount, 0)"));
    assert_eq!(column.column_name, "discount");
    assert_eq!(column.table_alias.as_deref(), Some("p"));
}
