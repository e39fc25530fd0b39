//! SQL regeneration from the syntax tree.

use crate::error::AnalysisError;
use crate::parser::parse_sql_with_dialect;
use crate::types::FormatOptions;

/// Re-renders `sql` from its syntax tree, one statement per `;`-terminated chunk.
///
/// Invalid SQL cannot be formatted and fails with [`AnalysisError::Format`].
pub fn format(sql: &str, options: &FormatOptions) -> Result<String, AnalysisError> {
    if sql.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    let statements = parse_sql_with_dialect(sql, options.dialect).map_err(AnalysisError::Format)?;
    let rendered: Vec<String> = statements
        .iter()
        .map(|statement| {
            if options.pretty {
                format!("{statement:#}")
            } else {
                statement.to_string()
            }
        })
        .collect();
    Ok(rendered.join(";\n"))
}
