//! `cablelist catalog` command - Units, connections and vehicle types
//!
//! The catalog holds what links refer to. Adding a unit connection can
//! derive the links its article link templates call for right away.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::commands::derive::print_outcomes;
use crate::cli::helpers::{or_dash, Context};
use crate::cli::output::{emit, Table};
use crate::core::store::ArticleLink;
use crate::core::{
    ArticleConnectionId, LinkDirection, LinkType, LinkVersion, ModificationKind, UnitId,
};

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Units (devices placed in the schema)
    #[command(subcommand)]
    Unit(UnitCommands),

    /// Article connections (connection points of an article)
    #[command(subcommand)]
    ArticleConnection(ArticleConnectionCommands),

    /// Unit connections
    #[command(subcommand)]
    Connection(ConnectionCommands),

    /// Vehicle types
    #[command(subcommand)]
    VehicleType(VehicleTypeCommands),

    /// Register an article link template
    Template(TemplateArgs),
}

#[derive(Subcommand, Debug)]
pub enum UnitCommands {
    /// Add a unit
    Add {
        /// Position of the unit in the schema
        schema_position: String,
    },
    /// List units
    List,
}

#[derive(Subcommand, Debug)]
pub enum ArticleConnectionCommands {
    /// Add an article connection
    Add {
        contact_name: String,
    },
    /// List article connections
    List,
}

#[derive(Subcommand, Debug)]
pub enum ConnectionCommands {
    /// Add a connection to a unit
    Add {
        /// Contact name of the connection
        contact_name: String,

        /// Unit the connection belongs to
        #[arg(long)]
        unit: UnitId,

        /// Article connection the connection is built from
        #[arg(long)]
        article: Option<ArticleConnectionId>,

        /// Derive the links the new connection completes in this version
        #[arg(long)]
        derive: Option<LinkVersion>,

        /// Modification of derived links
        #[arg(long, short = 'm', default_value = "NEW", requires = "derive")]
        modification: ModificationKind,
    },
    /// List connections
    List {
        /// Only connections of this unit
        #[arg(long)]
        unit: Option<UnitId>,
    },
}

#[derive(Subcommand, Debug)]
pub enum VehicleTypeCommands {
    /// Add a vehicle type
    Add {
        /// Type name (e.g. "RE 460")
        type_name: String,

        #[arg(long)]
        sub_type: Option<String>,

        #[arg(long)]
        series: Option<String>,
    },
    /// List vehicle types
    List,
}

#[derive(clap::Args, Debug)]
pub struct TemplateArgs {
    /// Article connection at the start
    pub start: ArticleConnectionId,

    /// Article connection at the end
    pub end: ArticleConnectionId,

    /// Link type code (CABLELINK, INTERNLINK, CONNECTION, TESTLINK)
    #[arg(long = "type", short = 't')]
    pub link_type: LinkType,

    /// Direction code (BID, STE, ETS)
    #[arg(long, short = 'd', default_value = "BID")]
    pub direction: LinkDirection,

    #[arg(long)]
    pub identification: Option<String>,

    /// Resistance [Ohm]
    #[arg(long)]
    pub resistance: Option<f64>,
}

pub fn run(cmd: CatalogCommands, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    match cmd {
        CatalogCommands::Unit(UnitCommands::Add { schema_position }) => {
            let id = ctx.db.catalog().add_unit(&schema_position)?;
            ctx.success(format!("Added unit {} ({})", style(id).cyan(), schema_position));
            Ok(())
        }
        CatalogCommands::Unit(UnitCommands::List) => {
            let units = ctx.db.catalog().units()?;
            let mut table = Table::new(["ID", "SCHEMA POSITION"]);
            for unit in &units {
                table.push(vec![unit.id.to_string(), unit.schema_position.clone()]);
            }
            emit(ctx.format, &units, &table, "unit")
        }
        CatalogCommands::ArticleConnection(ArticleConnectionCommands::Add { contact_name }) => {
            let id = ctx.db.catalog().add_article_connection(&contact_name)?;
            ctx.success(format!(
                "Added article connection {} ({})",
                style(id).cyan(),
                contact_name
            ));
            Ok(())
        }
        CatalogCommands::ArticleConnection(ArticleConnectionCommands::List) => {
            let connections = ctx.db.catalog().article_connections()?;
            let mut table = Table::new(["ID", "CONTACT"]);
            for connection in &connections {
                table.push(vec![connection.id.to_string(), connection.contact_name.clone()]);
            }
            emit(ctx.format, &connections, &table, "article connection")
        }
        CatalogCommands::Connection(ConnectionCommands::Add {
            contact_name,
            unit,
            article,
            derive,
            modification,
        }) => {
            let id = ctx.db.catalog().add_unit_connection(unit, article, &contact_name)?;
            ctx.success(format!(
                "Added connection {} ({}) to unit {}",
                style(id).cyan(),
                contact_name,
                unit
            ));
            if let Some(version) = derive {
                let outcomes = ctx.db.derivation().on_connection_added(id, version, modification)?;
                print_outcomes(&ctx, &outcomes)?;
            }
            Ok(())
        }
        CatalogCommands::Connection(ConnectionCommands::List { unit }) => {
            let connections = ctx.db.catalog().unit_connections(unit)?;
            let mut table = Table::new(["ID", "UNIT", "ARTICLE", "CONTACT"]);
            for connection in &connections {
                table.push(vec![
                    connection.id.to_string(),
                    connection.unit.to_string(),
                    or_dash(connection.article_connection),
                    connection.contact_name.clone(),
                ]);
            }
            emit(ctx.format, &connections, &table, "connection")
        }
        CatalogCommands::VehicleType(VehicleTypeCommands::Add {
            type_name,
            sub_type,
            series,
        }) => {
            let id = ctx.db.catalog().add_vehicle_type(
                &type_name,
                sub_type.as_deref(),
                series.as_deref(),
            )?;
            ctx.success(format!("Added vehicle type {} ({})", style(id).cyan(), type_name));
            Ok(())
        }
        CatalogCommands::VehicleType(VehicleTypeCommands::List) => {
            let types = ctx.db.catalog().vehicle_types()?;
            let mut table = Table::new(["ID", "TYPE", "SUB TYPE", "SERIES"]);
            for vt in &types {
                table.push(vec![
                    vt.id.to_string(),
                    vt.type_name.clone(),
                    or_dash(vt.sub_type.as_deref()),
                    or_dash(vt.series_number.as_deref()),
                ]);
            }
            emit(ctx.format, &types, &table, "vehicle type")
        }
        CatalogCommands::Template(args) => run_template(&mut ctx, args),
    }
}

fn run_template(ctx: &mut Context, args: TemplateArgs) -> Result<()> {
    check_direction(args.link_type, args.direction)?;

    let mut template = ArticleLink::new(args.start, args.end, args.link_type, args.direction);
    template.identification = args.identification;
    template.resistance = args.resistance;
    ctx.db.catalog().add_article_link(&template)?;

    ctx.success(format!(
        "Added template {} ({} {})",
        style(&template).cyan(),
        template.link_type,
        template.direction.picture()
    ));
    Ok(())
}

/// Reject a direction the link type does not allow
pub fn check_direction(link_type: LinkType, direction: LinkDirection) -> Result<()> {
    if direction.is_allowed_for(link_type) {
        return Ok(());
    }
    let allowed = link_type
        .allowed_directions()
        .iter()
        .map(|d| d.code())
        .collect::<Vec<_>>()
        .join(", ");
    Err(miette::miette!(
        help = format!("allowed: {}", allowed),
        "direction {} is not allowed for {} links",
        direction,
        link_type.name()
    ))
}
