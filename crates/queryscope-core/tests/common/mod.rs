#![allow(dead_code)]

use queryscope_core::{analyze, AnalysisOptions, AnalysisResult, ColumnReference};

pub fn analyze_default(sql: &str) -> AnalysisResult {
    analyze(sql, &AnalysisOptions::default()).expect("non-empty input")
}

/// `alias.column`, or the bare column name when unqualified.
pub fn qualified_names(columns: &[ColumnReference]) -> Vec<String> {
    columns
        .iter()
        .map(|c| match &c.table_alias {
            Some(alias) => format!("{alias}.{}", c.column_name),
            None => c.column_name.clone(),
        })
        .collect()
}

pub fn output_names(result: &AnalysisResult) -> Vec<String> {
    result
        .final_output_columns
        .iter()
        .map(|c| c.output_name().to_string())
        .collect()
}
