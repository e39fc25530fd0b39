//! Fuzz target for the parser adapter and the batch splitter.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use queryscope_core::{split_batches, validate_syntax, Dialect};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sql: String,
    dialect_idx: u8,
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
    let validation = validate_syntax(&input.sql, input.dialect());
    assert_eq!(validation.is_valid, validation.errors.is_empty());
    for batch in split_batches(&input.sql) {
        assert!(!batch.trim().is_empty());
    }
});
