//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    assign::AssignCommands, catalog::CatalogCommands, completions::CompletionsArgs,
    derive::DeriveCommands, init::InitArgs, link::LinkCommands, status::StatusArgs,
    template::TemplateCommands, version::VersionCommands,
};

#[derive(Parser)]
#[command(name = "cablelist")]
#[command(author, version, about = "Cable list link database")]
#[command(long_about = "Track links between unit connections, their change history across design versions and the vehicle types that use them.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .cablelist/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Link database file (default: from config, then .cablelist/links.db)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new cablelist project
    Init(InitArgs),

    /// Design versions
    #[command(subcommand)]
    Version(VersionCommands),

    /// Units, connections, vehicle types and templates
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Article link templates
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Links and their history
    #[command(subcommand)]
    Link(LinkCommands),

    /// Vehicle type assignments of a link
    #[command(subcommand)]
    Assign(AssignCommands),

    /// Derive links from article link templates
    #[command(subcommand)]
    Derive(DeriveCommands),

    /// Show database statistics
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for terminals
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// YAML format
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}
