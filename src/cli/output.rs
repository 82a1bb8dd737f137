//! Output rendering for list and show commands
//!
//! Every command hands over both a serializable value (for `json`/`yaml`)
//! and the rows of its table (for `auto`/`tsv`).

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::args::OutputFormat;

/// Rows of a table with their header
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<const N: usize>(headers: [&str; N]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    fn render_tsv(&self) -> String {
        let mut out = self.headers.join("\t");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
        out
    }

    fn render_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().map(String::as_str));
        for row in &self.rows {
            builder.push_record(row.iter().map(String::as_str));
        }
        builder.build().with(Style::sharp()).to_string()
    }
}

/// Print `value` in the requested format
///
/// `noun` names the listed things in the summary line of the table output.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, table: &Table, noun: &str) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            print!("{}", table.render_tsv());
        }
        OutputFormat::Auto => {
            if table.is_empty() {
                println!("{}", style(format!("No {} found.", noun)).dim());
            } else {
                println!("{}", table.render_table());
                println!("{}", style(format!("{} {}(s) found", table.len(), noun)).dim());
            }
        }
    }
    Ok(())
}
