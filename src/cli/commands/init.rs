//! `cablelist init` command - Initialize a new cablelist project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::core::project::{Project, ProjectError, DATABASE_FILE, PROJECT_DIR};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .cablelist/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            println!(
                "{} Initialized cablelist project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created project structure:");
            print_structure(project.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} Register the first design version",
                style("cablelist version add 1.0").yellow()
            );
            println!(
                "  {} Add units and their connections",
                style("cablelist catalog unit add").yellow()
            );
            println!(
                "  {} Add a link",
                style("cablelist link add").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} cablelist project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("cablelist init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    let entries = [
        format!("{}/", PROJECT_DIR),
        format!("{}/config.yaml", PROJECT_DIR),
        format!("{}/{}", PROJECT_DIR, DATABASE_FILE),
    ];

    for entry in &entries {
        if root.join(entry).exists() {
            println!("  {}", style(entry).dim());
        }
    }
}
