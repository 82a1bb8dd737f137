//! Shared helper functions for CLI commands
//!
//! Opening the database of the current project and formatting the values
//! most commands print.

use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeSet;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::core::store::{pairs_from_lists, VehicleTypePair};
use crate::core::{Config, Database, Project, VehicleTypeId};

/// Everything a command needs to work on the link database
pub struct Context {
    pub config: Config,
    pub db: Database,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Context {
    /// Open the database selected by the global options
    ///
    /// `--database` wins over the configured database; without it a project
    /// must be found.
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(root) => Some(Project::discover_from(root).map_err(|e| miette::miette!("{}", e))?),
            None => Project::discover().ok(),
        };
        let config = Config::load_for(project.as_ref());

        let path = match (&global.database, &project) {
            (Some(path), _) => path.clone(),
            (None, Some(project)) => project.database_path(&config),
            (None, None) => match &config.database {
                Some(path) => path.clone(),
                None => {
                    return Err(miette::miette!(
                        "not a cablelist project. Run 'cablelist init' or pass --database."
                    ))
                }
            },
        };

        tracing::debug!(path = %path.display(), "opening link database");
        let db = Database::open(&path)?;
        let format = resolve_format(global.format, &config);
        Ok(Self {
            config,
            db,
            format,
            quiet: global.quiet,
        })
    }

    /// Print a success line unless `--quiet` was given
    pub fn success(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }
}

/// `auto` falls back to the configured default format
pub fn resolve_format(requested: OutputFormat, config: &Config) -> OutputFormat {
    if requested != OutputFormat::Auto {
        return requested;
    }
    config
        .default_format
        .as_deref()
        .and_then(|f| f.parse().ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Vehicle type pairs from `--start`/`--end` lists
///
/// `--pair START:END` entries are added as they are.
pub fn vehicle_type_pairs(
    starts: &[VehicleTypeId],
    ends: &[VehicleTypeId],
    pairs: &[String],
) -> Result<BTreeSet<VehicleTypePair>> {
    let mut set = if starts.is_empty() && ends.is_empty() {
        BTreeSet::new()
    } else {
        pairs_from_lists(starts, ends).map_err(crate::core::CableListError::from)?
    };
    for pair in pairs {
        set.insert(parse_pair(pair)?);
    }
    Ok(set)
}

/// Parse `START:END` into a vehicle type pair
pub fn parse_pair(s: &str) -> Result<VehicleTypePair> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| miette::miette!("invalid vehicle type pair '{}' (expected START:END)", s))?;
    let start: VehicleTypeId = start.parse().into_diagnostic()?;
    let end: VehicleTypeId = end.parse().into_diagnostic()?;
    Ok(VehicleTypePair::new(start, end))
}

/// Format an optional value for display, "-" when absent
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Format vehicle type pairs as `1:2, 3:4`
pub fn format_pairs(pairs: &BTreeSet<VehicleTypePair>) -> String {
    if pairs.is_empty() {
        return "-".to_string();
    }
    pairs
        .iter()
        .map(|p| format!("{}:{}", p.start, p.end))
        .collect::<Vec<_>>()
        .join(", ")
}
