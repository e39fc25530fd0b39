//! QueryScope CLI - SQL query structure analyzer

use queryscope_cli::cli;
use queryscope_cli::input;
use queryscope_cli::output;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use queryscope_core::{
    analyze, analyze_batch, format, validate_syntax, AnalysisError, AnalysisResult,
};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Args, OutputFormat};
use input::SqlSource;
use output::{
    format_analysis_table, format_json, format_validation_table, FileAnalysis, FileValidation,
};

/// Syntax errors in the input.
const EXIT_FAILURE: u8 = 1;
/// Usage error (unreadable or empty input, unwritable output).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("queryscope: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Returns whether any input had syntax errors.
fn run(args: Args) -> Result<bool> {
    let sources = input::read_input(&args.files)?;
    info!(files = sources.len(), "read input");

    if args.validate {
        run_validate(&args, &sources)
    } else if args.pretty_print {
        run_format(&args, &sources)
    } else {
        run_analyze(&args, &sources)
    }
}

fn run_analyze(args: &Args, sources: &[SqlSource]) -> Result<bool> {
    let options = args.analysis_options();
    let reports = sources
        .iter()
        .map(|source| -> Result<FileAnalysis> {
            debug!(file = %source.name, batch = args.batch, "analyzing");
            let results: Vec<AnalysisResult> = if args.batch {
                analyze_batch(&source.content, &options)
                    .with_context(|| format!("Cannot analyze {}", source.name))?
                    .collect()
            } else {
                vec![analyze(&source.content, &options)
                    .with_context(|| format!("Cannot analyze {}", source.name))?]
            };
            Ok(FileAnalysis {
                file: source.name.clone(),
                results,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let output_str = match args.format {
        OutputFormat::Json => format_json(&reports, args.compact)?,
        OutputFormat::Table => format_analysis_table(&reports, use_colors(args)),
    };
    write_output(&args.output, &output_str)?;

    let has_errors = reports.iter().any(FileAnalysis::has_errors);
    if has_errors && !args.quiet && args.format == OutputFormat::Json {
        for report in reports.iter().filter(|report| report.has_errors()) {
            eprintln!("queryscope: {}: syntax errors", report.file);
        }
    }
    Ok(has_errors)
}

fn run_validate(args: &Args, sources: &[SqlSource]) -> Result<bool> {
    let dialect = args.dialect.into();
    let reports: Vec<FileValidation> = sources
        .iter()
        .map(|source| FileValidation {
            file: source.name.clone(),
            validation: validate_syntax(&source.content, dialect),
        })
        .collect();

    let output_str = match args.format {
        OutputFormat::Json => format_json(&reports, args.compact)?,
        OutputFormat::Table => format_validation_table(&reports, use_colors(args)),
    };
    write_output(&args.output, &output_str)?;

    Ok(reports.iter().any(|report| !report.validation.is_valid))
}

fn run_format(args: &Args, sources: &[SqlSource]) -> Result<bool> {
    let options = args.format_options();
    let mut formatted = Vec::with_capacity(sources.len());
    let mut has_errors = false;

    for source in sources {
        match format(&source.content, &options) {
            Ok(sql) => formatted.push(sql),
            Err(AnalysisError::Format(err)) => {
                has_errors = true;
                if !args.quiet {
                    eprintln!("queryscope: {}: {}", source.name, err.to_positioned_string());
                }
            }
            Err(err) => return Err(err).with_context(|| format!("Cannot format {}", source.name)),
        }
    }

    write_output(&args.output, &formatted.join(";\n\n"))?;
    Ok(has_errors)
}

fn use_colors(args: &Args) -> bool {
    args.output.is_none() && io::stdout().is_terminal()
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure newline at end for terminal output
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
