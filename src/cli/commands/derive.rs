//! `cablelist derive` command - Links from article link templates
//!
//! A unit whose connections match both ends of a template gets the link the
//! template describes. Pairs that already have a link are left alone.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::Context;
use crate::cli::output::{emit, Table};
use crate::core::store::Materialized;
use crate::core::{LinkVersion, ModificationKind, UnitConnectionId, UnitId};

#[derive(Subcommand, Debug)]
pub enum DeriveCommands {
    /// Derive every templated link of a unit
    Unit {
        unit: UnitId,

        /// Version of the derived links
        #[arg(long)]
        version: LinkVersion,

        #[arg(long, short = 'm', default_value = "NEW")]
        modification: ModificationKind,

        /// Only list the template matches, store nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Derive the links an existing connection completes
    Connection {
        connection: UnitConnectionId,

        #[arg(long)]
        version: LinkVersion,

        #[arg(long, short = 'm', default_value = "NEW")]
        modification: ModificationKind,
    },
}

pub fn run(cmd: DeriveCommands, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    match cmd {
        DeriveCommands::Unit {
            unit,
            dry_run: true,
            ..
        } => {
            let matches = ctx.db.derivation().connections_satisfying_templates(unit)?;
            let mut table = Table::new(["TEMPLATE", "START", "END", "TYPE"]);
            for m in &matches {
                table.push(vec![
                    m.template.to_string(),
                    m.start.to_string(),
                    m.end.to_string(),
                    m.template.link_type.to_string(),
                ]);
            }
            emit(ctx.format, &matches, &table, "template match")
        }
        DeriveCommands::Unit {
            unit,
            version,
            modification,
            ..
        } => {
            let outcomes = ctx.db.derivation().derive_unit(unit, version, modification)?;
            print_outcomes(&ctx, &outcomes)
        }
        DeriveCommands::Connection {
            connection,
            version,
            modification,
        } => {
            let (unit, article_connection) = {
                let catalog = ctx.db.catalog();
                let unit = catalog
                    .unit_of(connection)?
                    .ok_or_else(|| miette::miette!("unknown connection {}", connection))?;
                (unit, catalog.article_connection_of(connection)?)
            };
            if ctx.format == OutputFormat::Auto && !ctx.quiet {
                let note = match article_connection {
                    Some(article) => format!(
                        "Connection {} of unit {} (article connection {})",
                        connection, unit, article
                    ),
                    None => format!(
                        "Connection {} of unit {} has no article connection, no template applies",
                        connection, unit
                    ),
                };
                println!("{}", style(note).dim());
            }
            let outcomes = ctx
                .db
                .derivation()
                .on_connection_added(connection, version, modification)?;
            print_outcomes(&ctx, &outcomes)
        }
    }
}

/// Report derivation outcomes: created links first, then a summary
pub fn print_outcomes(ctx: &Context, outcomes: &[Materialized]) -> Result<()> {
    if ctx.format != OutputFormat::Auto {
        let mut table = Table::new(["OUTCOME", "KEY"]);
        for outcome in outcomes {
            let label = if outcome.is_created() { "created" } else { "existing" };
            table.push(vec![label.to_string(), outcome.key().to_string()]);
        }
        return emit(ctx.format, &outcomes, &table, "derived link");
    }

    let created: Vec<_> = outcomes.iter().filter(|o| o.is_created()).collect();
    for outcome in &created {
        ctx.success(format!("Derived link {}", style(outcome.key()).cyan()));
    }
    if !ctx.quiet {
        println!(
            "{}",
            style(format!(
                "{} link(s) derived, {} already present",
                created.len(),
                outcomes.len() - created.len()
            ))
            .dim()
        );
    }
    Ok(())
}
