//! JSON output formatting.

use anyhow::{Context, Result};
use queryscope_core::{AnalysisResult, SyntaxValidation};
use serde::Serialize;

/// Analysis results of one input file. Holds one result per statement in batch mode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysis {
    pub file: String,
    pub results: Vec<AnalysisResult>,
}

impl FileAnalysis {
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(AnalysisResult::has_errors)
    }
}

/// Syntax check of one input file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileValidation {
    pub file: String,
    #[serde(flatten)]
    pub validation: SyntaxValidation,
}

/// Format any report as JSON.
///
/// If `compact` is true, outputs minified JSON without whitespace.
pub fn format_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    json.context("Failed to serialize JSON output")
}
