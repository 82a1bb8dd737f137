//! `cablelist status` command - Link database statistics

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{or_dash, Context};

#[derive(clap::Args, Debug)]
pub struct StatusArgs {}

pub fn run(_args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let stats = ctx.db.statistics()?;
    let latest = ctx.db.versions().latest()?;

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&stats).into_diagnostic()?);
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!("{}", style("Link Database").bold());
            println!("{}", style("─".repeat(40)).dim());
            if let Some(path) = ctx.db.path() {
                println!("  Location:         {}", path.display());
            }
            println!(
                "  Latest version:   {}",
                style(or_dash(latest)).cyan()
            );
            println!("  Versions:         {}", style(stats.versions).cyan());
            println!("  Links:            {}", style(stats.links).cyan());
            println!("  History entries:  {}", style(stats.history_entries).cyan());
            println!(
                "  Vehicle types:    {}",
                style(stats.vehicle_type_assignments).cyan()
            );
            println!("  Templates:        {}", style(stats.article_links).cyan());
            println!(
                "  Database size:    {} KB",
                style(stats.db_size_bytes / 1024).cyan()
            );
        }
    }

    Ok(())
}
