//! Output formatting utilities

use std::io::{self, IsTerminal};

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;
use crate::export::{tsv_body, Table};

/// Determine the effective output format based on context
///
/// Lists render as a table on a terminal and as TSV when piped; single
/// records default to YAML.
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if !is_list {
                OutputFormat::Yaml
            } else if io::stdout().is_terminal() {
                OutputFormat::Table
            } else {
                OutputFormat::Tsv
            }
        }
        other => other,
    }
}

/// Render a table in the requested format
///
/// `records` is what json/yaml serialize, so machine output carries the full
/// records rather than the rendered cells.
pub fn print_table<T: Serialize + ?Sized>(
    table: &Table,
    records: &T,
    format: OutputFormat,
) -> Result<()> {
    match effective_format(format, true) {
        OutputFormat::Json => print_json(records)?,
        OutputFormat::Yaml => print_yaml(records)?,
        OutputFormat::Tsv => print!("{}", tsv_body(table).into_diagnostic()?),
        OutputFormat::Table | OutputFormat::Auto => println!("{}", render_table(table)),
    }
    Ok(())
}

pub fn render_table(table: &Table) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.headers.iter().map(String::as_str));
    for row in &table.rows {
        builder.push_record(row.iter().map(String::as_str));
    }
    let mut rendered = builder.build();
    rendered.with(Style::rounded());
    rendered.to_string()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}

pub fn print_yaml<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let yaml = serde_yml::to_string(value).into_diagnostic()?;
    print!("{}", yaml);
    Ok(())
}
