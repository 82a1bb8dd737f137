use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use cablelist::cli::{Cli, Commands, GlobalOpts};
use cablelist::core::{Config, Project};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        Commands::Init(args) => cablelist::cli::commands::init::run(args),
        Commands::Version(cmd) => cablelist::cli::commands::version::run(cmd, &global),
        Commands::Catalog(cmd) => cablelist::cli::commands::catalog::run(cmd, &global),
        Commands::Template(cmd) => cablelist::cli::commands::template::run(cmd, &global),
        Commands::Link(cmd) => cablelist::cli::commands::link::run(cmd, &global),
        Commands::Assign(cmd) => cablelist::cli::commands::assign::run(cmd, &global),
        Commands::Derive(cmd) => cablelist::cli::commands::derive::run(cmd, &global),
        Commands::Status(args) => cablelist::cli::commands::status::run(args, &global),
        Commands::Completions(args) => cablelist::cli::commands::completions::run(args),
    }
}

/// Logs go to stderr; RUST_LOG wins over the configured filter
fn init_logging(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let project = match &global.project {
            Some(root) => Project::discover_from(root).ok(),
            None => Project::discover().ok(),
        };
        let config = Config::load_for(project.as_ref());
        EnvFilter::new(config.log_filter(global.verbose))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
