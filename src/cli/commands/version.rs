//! `cablelist version` command - Design version registry

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::Context;
use crate::cli::output::{emit, Table};
use crate::core::LinkVersion;

#[derive(Subcommand, Debug)]
pub enum VersionCommands {
    /// Register a version and carry the previous version's links into it
    Add {
        /// Version in decimal form (e.g. 1.2)
        version: LinkVersion,
    },

    /// List registered versions
    List,

    /// Remove a version no history entry refers to
    Rm {
        version: LinkVersion,
    },
}

pub fn run(cmd: VersionCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        VersionCommands::Add { version } => run_add(version, global),
        VersionCommands::List => run_list(global),
        VersionCommands::Rm { version } => run_rm(version, global),
    }
}

fn run_add(version: LinkVersion, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let carried = ctx.db.versions().add(version)?;
    ctx.success(format!(
        "Registered version {} ({} link(s) carried over)",
        style(version).cyan(),
        carried
    ));
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let versions = ctx.db.versions().list()?;

    let mut table = Table::new(["VERSION", "STORED"]);
    for version in &versions {
        table.push(vec![version.to_string(), version.as_integer().to_string()]);
    }
    emit(ctx.format, &versions, &table, "version")
}

fn run_rm(version: LinkVersion, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    if ctx.db.versions().remove(version)? {
        ctx.success(format!("Removed version {}", style(version).cyan()));
        Ok(())
    } else {
        Err(miette::miette!("version {} is not registered", version))
    }
}
