//! `cablelist link` command - Links and their history
//!
//! Links are addressed by their full key `START:END:VERSION:MODIFICATION`,
//! e.g. `12:13:1.2:NEW`.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::commands::catalog::check_direction;
use crate::cli::helpers::{format_pairs, or_dash, vehicle_type_pairs, Context};
use crate::cli::output::{emit, Table};
use crate::core::store::VehicleTypePair;
use crate::core::{
    LinkAttributes, LinkData, LinkDirection, LinkPk, LinkType, LinkVersion, UnitConnectionId,
    VehicleTypeId, WireId,
};

#[derive(Subcommand, Debug)]
pub enum LinkCommands {
    /// Add a link history entry
    Add {
        /// Link key (START:END:VERSION:MODIFICATION)
        key: LinkPk,

        /// Link type code (CABLELINK, INTERNLINK, CONNECTION, TESTLINK)
        #[arg(long = "type", short = 't')]
        link_type: LinkType,

        /// Direction code (BID, STE, ETS)
        #[arg(long, short = 'd', default_value = "BID")]
        direction: LinkDirection,

        #[command(flatten)]
        attributes: AttributeArgs,

        #[command(flatten)]
        vehicle_types: VehicleTypeArgs,
    },

    /// Show a link with its vehicle types
    Show {
        key: LinkPk,
    },

    /// Change a link's key, attributes or vehicle types
    Edit {
        key: LinkPk,

        /// New key; a different connection pair replaces the link
        #[arg(long = "key")]
        new_key: Option<LinkPk>,

        #[arg(long = "type", short = 't')]
        link_type: Option<LinkType>,

        #[arg(long, short = 'd')]
        direction: Option<LinkDirection>,

        #[command(flatten)]
        attributes: AttributeArgs,

        // Replaces the vehicle types; kept when none are given
        #[command(flatten)]
        vehicle_types: VehicleTypeArgs,
    },

    /// Add the links of a YAML or JSON file, all or none
    ///
    /// The file holds a list of links shaped like `link show -f yaml`.
    Import {
        file: PathBuf,
    },

    /// Remove links with their whole history
    Rm {
        #[arg(required = true)]
        keys: Vec<LinkPk>,
    },

    /// List links
    List {
        /// Only entries of this version
        #[arg(long)]
        version: Option<LinkVersion>,
    },

    /// History of a connection pair
    History {
        start: UnitConnectionId,
        end: UnitConnectionId,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct AttributeArgs {
    #[arg(long)]
    pub identification: Option<String>,

    /// Resistance [Ohm]
    #[arg(long)]
    pub resistance: Option<f64>,

    #[arg(long)]
    pub length: Option<f64>,

    #[arg(long)]
    pub remarks: Option<String>,

    #[arg(long)]
    pub wire: Option<WireId>,
}

impl AttributeArgs {
    fn apply(self, attributes: &mut LinkAttributes) {
        if self.identification.is_some() {
            attributes.identification = self.identification;
        }
        if self.resistance.is_some() {
            attributes.resistance = self.resistance;
        }
        if self.length.is_some() {
            attributes.length = self.length;
        }
        if self.remarks.is_some() {
            attributes.remarks = self.remarks;
        }
        if self.wire.is_some() {
            attributes.wire = self.wire;
        }
    }
}

#[derive(clap::Args, Debug, Default)]
pub struct VehicleTypeArgs {
    /// Vehicle types at the start (paired with --end)
    #[arg(long = "start", value_delimiter = ',')]
    pub starts: Vec<VehicleTypeId>,

    /// Vehicle types at the end (paired with --start)
    #[arg(long = "end", value_delimiter = ',')]
    pub ends: Vec<VehicleTypeId>,

    /// Vehicle type pair START:END
    #[arg(long = "pair")]
    pub pairs: Vec<String>,
}

impl VehicleTypeArgs {
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty() && self.ends.is_empty() && self.pairs.is_empty()
    }

    pub fn to_pairs(&self) -> Result<BTreeSet<VehicleTypePair>> {
        vehicle_type_pairs(&self.starts, &self.ends, &self.pairs)
    }
}

/// A link as shown by `link show` and read by `link import`
#[derive(Serialize, Deserialize)]
struct LinkView {
    #[serde(flatten)]
    link: LinkData,
    #[serde(default)]
    vehicle_types: BTreeSet<VehicleTypePair>,
}

pub fn run(cmd: LinkCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        LinkCommands::Add {
            key,
            link_type,
            direction,
            attributes,
            vehicle_types,
        } => run_add(key, link_type, direction, attributes, vehicle_types, global),
        LinkCommands::Show { key } => run_show(key, global),
        LinkCommands::Edit {
            key,
            new_key,
            link_type,
            direction,
            attributes,
            vehicle_types,
        } => {
            let edit = Edit {
                key,
                new_key,
                link_type,
                direction,
                attributes,
                vehicle_types,
            };
            run_edit(edit, global)
        }
        LinkCommands::Import { file } => run_import(&file, global),
        LinkCommands::Rm { keys } => run_rm(&keys, global),
        LinkCommands::List { version } => run_list(version, global),
        LinkCommands::History { start, end } => run_history(start, end, global),
    }
}

fn run_add(
    key: LinkPk,
    link_type: LinkType,
    direction: LinkDirection,
    extra: AttributeArgs,
    vehicle_types: VehicleTypeArgs,
    global: &GlobalOpts,
) -> Result<()> {
    check_direction(link_type, direction)?;
    let pairs = vehicle_types.to_pairs()?;

    let mut attributes = LinkAttributes::new(link_type, direction);
    extra.apply(&mut attributes);
    let data = LinkData::new(key, attributes);

    let mut ctx = Context::open(global)?;
    if ctx.db.links().exists(&key)? {
        return Err(miette::miette!(
            help = "use 'cablelist link edit' to change it",
            "link {} already exists",
            key
        ));
    }
    ctx.db.links().add(&data, &pairs)?;

    ctx.success(format!(
        "Added link {} ({} vehicle type pair(s))",
        style(key).cyan(),
        pairs.len()
    ));
    Ok(())
}

fn run_show(key: LinkPk, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let link = ctx
        .db
        .links()
        .get(&key)?
        .ok_or_else(|| miette::miette!("no link {}", key))?;
    let vehicle_types = ctx.db.vehicle_type_links().get_assigned(&key)?;

    if ctx.format != OutputFormat::Auto {
        let view = LinkView { link, vehicle_types };
        let mut table = Table::new(LINK_HEADERS);
        table.push(link_row(&view.link));
        return emit(ctx.format, &view, &table, "link");
    }

    let a = &link.attributes;
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("Link").bold(), style(key).cyan());
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} ({})",
        style("Modification").bold(),
        key.modification,
        key.modification.name()
    );
    println!("{}: {} ({})", style("Type").bold(), a.link_type, a.link_type.name());
    println!(
        "{}: {} {}",
        style("Direction").bold(),
        a.direction,
        a.direction.picture()
    );
    println!(
        "{}: {}",
        style("Identification").bold(),
        or_dash(a.identification.as_deref())
    );
    println!(
        "{}: {} {}",
        style("Resistance").bold(),
        or_dash(a.resistance),
        a.link_type.value_unit()
    );
    println!("{}: {}", style("Length").bold(), or_dash(a.length));
    println!("{}: {}", style("Wire").bold(), or_dash(a.wire));
    if let Some(template) = a.article_link {
        println!(
            "{}: {}-{}",
            style("Template").bold(),
            template.connection_start,
            template.connection_end
        );
    }
    if let Some(remarks) = &a.remarks {
        println!("{}: {}", style("Remarks").bold(), remarks);
    }
    println!(
        "{}: {}",
        style("Vehicle types").bold(),
        format_pairs(&vehicle_types)
    );
    Ok(())
}

struct Edit {
    key: LinkPk,
    new_key: Option<LinkPk>,
    link_type: Option<LinkType>,
    direction: Option<LinkDirection>,
    attributes: AttributeArgs,
    vehicle_types: VehicleTypeArgs,
}

fn run_edit(edit: Edit, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let mut data = ctx
        .db
        .links()
        .get(&edit.key)?
        .ok_or_else(|| miette::miette!("no link {}", edit.key))?;

    let pairs = if edit.vehicle_types.is_empty() {
        ctx.db.vehicle_type_links().get_assigned(&edit.key)?
    } else {
        edit.vehicle_types.to_pairs()?
    };

    if let Some(new_key) = edit.new_key {
        data.key = new_key;
    }
    if let Some(link_type) = edit.link_type {
        data.attributes.link_type = link_type;
    }
    if let Some(direction) = edit.direction {
        data.attributes.direction = direction;
    }
    check_direction(data.attributes.link_type, data.attributes.direction)?;
    edit.attributes.apply(&mut data.attributes);

    if data.key != edit.key && ctx.db.links().exists(&data.key)? {
        return Err(miette::miette!("link {} already exists", data.key));
    }
    ctx.db.links().update(&edit.key, &data, &pairs)?;

    if data.key == edit.key {
        ctx.success(format!("Updated link {}", style(data.key).cyan()));
    } else {
        ctx.success(format!(
            "Updated link {} -> {}",
            style(edit.key).cyan(),
            style(data.key).cyan()
        ));
    }
    Ok(())
}

fn run_import(file: &Path, global: &GlobalOpts) -> Result<()> {
    let contents = std::fs::read_to_string(file).into_diagnostic()?;
    let views: Vec<LinkView> = serde_yml::from_str(&contents)
        .map_err(|e| miette::miette!("cannot read links from {}: {}", file.display(), e))?;

    let mut batch = Vec::with_capacity(views.len());
    for view in views {
        if view.link.key.modification.is_null() {
            return Err(miette::miette!(
                "link {}:{}:{} has no valid modification code",
                view.link.key.connection_start,
                view.link.key.connection_end,
                view.link.key.version
            ));
        }
        check_direction(view.link.attributes.link_type, view.link.attributes.direction)?;
        batch.push((view.link, view.vehicle_types));
    }

    let mut ctx = Context::open(global)?;
    for (data, _) in &batch {
        if ctx.db.links().exists(&data.key)? {
            return Err(miette::miette!(
                help = "nothing was imported",
                "link {} already exists",
                data.key
            ));
        }
    }
    ctx.db.links().add_many(&batch)?;

    ctx.success(format!(
        "Imported {} link(s) from {}",
        batch.len(),
        style(file.display()).cyan()
    ));
    Ok(())
}

fn run_rm(keys: &[LinkPk], global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    ctx.db.links().remove_many(keys)?;
    for key in keys {
        ctx.success(format!("Removed link {}", style(key).cyan()));
    }
    Ok(())
}

const LINK_HEADERS: [&str; 7] = ["KEY", "TYPE", "DIR", "IDENT", "RESISTANCE", "LENGTH", "WIRE"];

fn link_row(link: &LinkData) -> Vec<String> {
    let a = &link.attributes;
    vec![
        link.key.to_string(),
        a.link_type.to_string(),
        a.direction.picture().to_string(),
        or_dash(a.identification.as_deref()),
        or_dash(a.resistance),
        or_dash(a.length),
        or_dash(a.wire),
    ]
}

fn run_list(version: Option<LinkVersion>, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let links = ctx.db.links().list(version)?;

    let mut table = Table::new(LINK_HEADERS);
    for link in &links {
        table.push(link_row(link));
    }
    emit(ctx.format, &links, &table, "link")
}

fn run_history(start: UnitConnectionId, end: UnitConnectionId, global: &GlobalOpts) -> Result<()> {
    let mut ctx = Context::open(global)?;
    let history = ctx.db.links().history(start, end)?;

    let mut table = Table::new(["VERSION", "MODIFICATION", "KEY"]);
    for key in &history {
        table.push(vec![
            key.version.to_string(),
            key.modification.name().to_string(),
            key.to_string(),
        ]);
    }
    emit(ctx.format, &history, &table, "history entry")
}
