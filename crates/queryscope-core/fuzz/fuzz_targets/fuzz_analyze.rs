//! Fuzz target for the query analyzer.
//!
//! `analyze()` must never panic: invalid SQL ends up in `errors`, empty input is an `Err`.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use queryscope_core::{analyze, AnalysisOptions, Dialect};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sql: String,
    dialect_idx: u8,
    deduplicate: bool,
    nested: bool,
}

impl FuzzInput {
    fn dialect(&self) -> Dialect {
        match self.dialect_idx % 5 {
            0 => Dialect::Mssql,
            1 => Dialect::Postgres,
            2 => Dialect::Snowflake,
            3 => Dialect::Bigquery,
            _ => Dialect::Generic,
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let options = AnalysisOptions {
        dialect: input.dialect(),
        deduplicate_results: input.deduplicate,
        analyze_nested_queries: input.nested,
        ..AnalysisOptions::default()
    };
    if let Ok(result) = analyze(&input.sql, &options) {
        if !result.has_errors() {
            assert!(result.final_output_columns.len() <= result.select_columns.len());
        }
    }
});
