//! Human-readable table output formatting.

use super::json::{FileAnalysis, FileValidation};
use owo_colors::OwoColorize;
use queryscope_core::{AnalysisResult, ColumnLineage, ColumnReference, TableReference};
use std::fmt::Write;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Format analysis reports as text tables with optional colors.
pub fn format_analysis_table(reports: &[FileAnalysis], colored: bool) -> String {
    let mut out = String::new();
    write_header(&mut out, "QueryScope Analysis", colored);

    for report in reports {
        for (index, result) in report.results.iter().enumerate() {
            let title = if report.results.len() > 1 {
                format!("{} [statement {}]", report.file, index + 1)
            } else {
                report.file.clone()
            };
            write_result(&mut out, &title, result, colored);
        }
    }

    out
}

/// Format syntax check reports, one line per file.
pub fn format_validation_table(reports: &[FileValidation], colored: bool) -> String {
    let mut out = String::new();
    for report in reports {
        let status = match (report.validation.is_valid, colored) {
            (true, true) => "VALID".green().to_string(),
            (true, false) => "VALID".to_string(),
            (false, true) => "INVALID".red().to_string(),
            (false, false) => "INVALID".to_string(),
        };
        writeln!(out, "{status} {}", report.file).unwrap();
        for error in &report.validation.errors {
            writeln!(out, "  {error}").unwrap();
        }
    }
    out
}

fn write_header(out: &mut String, title: &str, colored: bool) {
    let line = "═".repeat(50);

    if colored {
        writeln!(out, "{}", title.bold()).unwrap();
        writeln!(out, "{}", line.dimmed()).unwrap();
    } else {
        writeln!(out, "{title}").unwrap();
        writeln!(out, "{line}").unwrap();
    }
}

fn write_section(out: &mut String, title: &str, colored: bool) {
    if colored {
        writeln!(out, "{}", title.bold()).unwrap();
    } else {
        writeln!(out, "{title}").unwrap();
    }
}

fn write_result(out: &mut String, title: &str, result: &AnalysisResult, colored: bool) {
    writeln!(out).unwrap();
    write_section(out, title, colored);

    if result.has_errors() {
        for error in &result.errors {
            if colored {
                writeln!(out, "  {} {error}", "ERROR".red()).unwrap();
            } else {
                writeln!(out, "  ERROR {error}").unwrap();
            }
        }
        return;
    }

    let stats = format!(
        "Summary: {} tables | {} select columns | {} output columns | {} CTEs | {} subqueries",
        result.tables.len(),
        result.select_columns.len(),
        result.final_output_columns.len(),
        result.ctes.len(),
        result.subqueries.len()
    );
    if colored {
        writeln!(out, "{}", stats.cyan()).unwrap();
    } else {
        writeln!(out, "{stats}").unwrap();
    }

    let schemas = result.schemas();
    if !schemas.is_empty() {
        writeln!(out, "Schemas: {}", schemas.join(", ")).unwrap();
    }

    if !result.tables.is_empty() {
        write_section(out, "Tables:", colored);
        writeln!(out, "{}", tables_table(&result.tables)).unwrap();
    }
    if !result.final_output_columns.is_empty() {
        write_section(out, "Output Columns:", colored);
        writeln!(out, "{}", columns_table(&result.final_output_columns)).unwrap();
    }
    if !result.column_lineage.is_empty() {
        write_section(out, "Lineage:", colored);
        writeln!(out, "{}", lineage_table(&result.column_lineage)).unwrap();
    }
    for cte in &result.ctes {
        let columns = cte
            .inner_analysis
            .as_deref()
            .map(|inner| inner.final_output_columns.len())
            .unwrap_or_default();
        writeln!(out, "CTE {} ({columns} output columns)", cte.name).unwrap();
    }
    for subquery in &result.subqueries {
        let alias = subquery
            .alias
            .as_deref()
            .map(|alias| format!(" {alias}"))
            .unwrap_or_default();
        writeln!(out, "{:?}{alias}: {}", subquery.subquery_type, subquery.query).unwrap();
    }
}

fn render(header: &[&str], rows: impl IntoIterator<Item = Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(header.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn tables_table(tables: &[TableReference]) -> String {
    render(
        &["Table", "Alias", "Type", "Join", "Direct", "Columns"],
        tables.iter().map(|table| {
            let name = match &table.schema {
                Some(schema) => format!("{schema}.{}", table.name),
                None => table.name.clone(),
            };
            vec![
                name,
                table.alias.clone().unwrap_or_default(),
                format!("{:?}", table.table_type),
                table
                    .join_type
                    .map(|join| format!("{join:?}"))
                    .unwrap_or_default(),
                if table.direct_reference { "yes" } else { "no" }.to_string(),
                (table.select_columns.len() + table.join_columns.len() + table.predicate_columns.len())
                    .to_string(),
            ]
        }),
    )
}

fn columns_table(columns: &[ColumnReference]) -> String {
    render(
        &["Name", "Source", "Kind", "Expression"],
        columns.iter().map(|column| {
            vec![
                column.output_name().to_string(),
                column
                    .source_identifier()
                    .map(|source| format!("{source}.{}", column.column_name))
                    .unwrap_or_else(|| column.column_name.clone()),
                format!("{:?}", column.expression_kind),
                column.expression.clone().unwrap_or_default(),
            ]
        }),
    )
}

fn lineage_table(lineage: &[ColumnLineage]) -> String {
    render(
        &["Output", "Sources", "Transformation"],
        lineage.iter().map(|entry| {
            let sources: Vec<String> = entry
                .source_columns
                .iter()
                .map(|source| source.signature())
                .collect();
            vec![
                entry.output_column.clone(),
                sources.join(", "),
                format!("{:?}", entry.transformation),
            ]
        }),
    )
}
