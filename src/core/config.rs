//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::Project;

/// Environment variable overriding the database file
pub const DATABASE_ENV: &str = "CABLELIST_DATABASE";

/// Environment variable overriding the log filter
pub const LOG_ENV: &str = "CABLELIST_LOG";

/// cablelist configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database file; relative paths are resolved against the project root
    pub database: Option<PathBuf>,

    /// Default output format
    pub default_format: Option<String>,

    /// Log filter directive, e.g. `info` or `cablelist=debug`
    pub log: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// The project layer is skipped when `project` is `None`.
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/cablelist/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.cablelist/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(database) = std::env::var(DATABASE_ENV) {
            config.database = Some(PathBuf::from(database));
        }
        if let Ok(log) = std::env::var(LOG_ENV) {
            config.log = Some(log);
        }

        config
    }

    fn read_file(path: &std::path::Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "cablelist")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.log.is_some() {
            self.log = other.log;
        }
    }

    /// Log filter: verbose beats the configured filter, `warn` otherwise
    pub fn log_filter(&self, verbose: bool) -> String {
        if verbose {
            "debug".to_string()
        } else {
            self.log.clone().unwrap_or_else(|| "warn".to_string())
        }
    }
}
