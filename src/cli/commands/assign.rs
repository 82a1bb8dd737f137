//! `cablelist assign` command - Vehicle type assignments of a link

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::commands::link::VehicleTypeArgs;
use crate::cli::helpers::{format_pairs, Context};
use crate::cli::output::{emit, Table};
use crate::core::store::AssignmentDiff;
use crate::core::{LinkPk, UnitId};

#[derive(Subcommand, Debug)]
pub enum AssignCommands {
    /// Make the given pairs the link's complete vehicle type set
    Set {
        key: LinkPk,

        #[command(flatten)]
        vehicle_types: VehicleTypeArgs,
    },

    /// Show the vehicle types of a link
    Show {
        key: LinkPk,
    },

    /// Remove every vehicle type of a link
    Clear {
        key: LinkPk,
    },

    /// Vehicle types of every link touching a unit's connections
    Unit {
        unit: UnitId,

        /// Remove them instead of listing them
        #[arg(long)]
        clear: bool,
    },
}

pub fn run(cmd: AssignCommands, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    match cmd {
        AssignCommands::Set { key, vehicle_types } => {
            let desired = vehicle_types.to_pairs()?;
            if !ctx.db.links().exists(&key)? {
                return Err(miette::miette!("no link {}", key));
            }
            let diff = ctx.db.vehicle_type_links().reconcile(&key, &desired)?;
            report_diff(&ctx, &key, &diff);
            Ok(())
        }
        AssignCommands::Show { key } => {
            let assigned = ctx.db.vehicle_type_links().get_assigned(&key)?;
            let mut table = Table::new(["START", "END"]);
            for pair in &assigned {
                table.push(vec![pair.start.to_string(), pair.end.to_string()]);
            }
            emit(ctx.format, &assigned, &table, "vehicle type pair")
        }
        AssignCommands::Clear { key } => {
            let diff = ctx.db.vehicle_type_links().remove_all(&key)?;
            report_diff(&ctx, &key, &diff);
            Ok(())
        }
        AssignCommands::Unit { unit, clear: true } => {
            let removed = ctx.db.vehicle_type_links().remove_by_unit(unit)?;
            ctx.success(format!(
                "Removed {} vehicle type assignment(s) of unit {}",
                removed,
                style(unit).cyan()
            ));
            Ok(())
        }
        AssignCommands::Unit { unit, clear: false } => {
            let assignments = ctx.db.vehicle_type_links().get_by_unit(unit)?;
            let mut table = Table::new(["LINK", "START", "END"]);
            for a in &assignments {
                table.push(vec![
                    a.key.to_string(),
                    a.pair.start.to_string(),
                    a.pair.end.to_string(),
                ]);
            }
            emit(ctx.format, &assignments, &table, "vehicle type assignment")
        }
    }
}

fn report_diff(ctx: &Context, key: &LinkPk, diff: &AssignmentDiff) {
    if diff.is_empty() {
        ctx.success(format!("Vehicle types of {} unchanged", style(key).cyan()));
        return;
    }
    ctx.success(format!(
        "Vehicle types of {}: +{} -{}",
        style(key).cyan(),
        diff.added.len(),
        diff.removed.len()
    ));
    if !ctx.quiet {
        if !diff.added.is_empty() {
            println!("  added:   {}", format_pairs(&diff.added));
        }
        if !diff.removed.is_empty() {
            println!("  removed: {}", format_pairs(&diff.removed));
        }
    }
}
