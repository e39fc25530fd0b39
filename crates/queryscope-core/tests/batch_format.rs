use queryscope_core::{
    analyze_batch, format, split_batches, AnalysisError, AnalysisOptions, Dialect, FormatOptions,
};

const SCRIPT: &str = "\
CREATE VIEW active_customers AS SELECT c.id, c.name FROM Customers c WHERE c.active = 1
GO
SELECT o.id FROM Orders o; SELECT p.name FROM Products p
go
UPDATE Products SET price = 0
";

#[test]
fn test_split_batches() {
    let batches = split_batches(SCRIPT);
    assert_eq!(batches.len(), 3);
    assert!(batches[0].starts_with("CREATE VIEW"));
    assert_eq!(batches[2], "UPDATE Products SET price = 0");
}

#[test]
fn test_batch_results_per_statement() {
    let results: Vec<_> = analyze_batch(SCRIPT, &AnalysisOptions::default())
        .unwrap()
        .collect();
    assert_eq!(results.len(), 4);

    let view = &results[0];
    assert_eq!(view.tables[0].name, "Customers");
    assert_eq!(view.final_output_columns.len(), 2);
    assert_eq!(view.tables[0].predicate_columns.len(), 1);

    assert_eq!(results[1].tables[0].name, "Orders");
    assert_eq!(results[2].tables[0].name, "Products");
    assert!(results[3].tables.is_empty());
    assert!(results.iter().all(|r| !r.has_errors()));
}

#[test]
fn test_batch_is_lazy_past_a_broken_batch() {
    let mut results =
        analyze_batch("SELECT a FROM t\nGO\nSELECT FROM WHERE", &AnalysisOptions::default())
            .unwrap();
    let first = results.next().unwrap();
    assert!(!first.has_errors());
    let second = results.next().unwrap();
    assert!(second.has_errors());
    assert!(second.errors[0].starts_with("Line "));
    assert!(results.next().is_none());
}

#[test]
fn test_batch_rejects_empty_input() {
    assert!(matches!(
        analyze_batch("", &AnalysisOptions::default()),
        Err(AnalysisError::EmptyInput)
    ));
}

#[test]
fn test_format_round_trip() {
    let options = FormatOptions {
        dialect: Dialect::Mssql,
        pretty: false,
    };
    let formatted = format("select a , b from t where a=1;select 2", &options).unwrap();
    assert_eq!(formatted, "SELECT a, b FROM t WHERE a = 1;\nSELECT 2");
    assert_eq!(format(&formatted, &options).unwrap(), formatted);
}

#[test]
fn test_format_invalid_sql_fails() {
    let err = format("SELECT FROM WHERE", &FormatOptions::default()).unwrap_err();
    match err {
        AnalysisError::Format(parse) => assert!(parse.position.is_some()),
        other => panic!("unexpected error: {other}"),
    }
}
