//! Output formatting modules.

pub mod json;
pub mod table;

pub use json::{format_json, FileAnalysis, FileValidation};
pub use table::{format_analysis_table, format_validation_table};
