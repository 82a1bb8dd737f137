//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::error::CableListError;
use crate::core::store::Database;
use crate::core::Config;

/// Name of the project directory
pub const PROJECT_DIR: &str = ".cablelist";

/// Default database file inside the project directory
pub const DATABASE_FILE: &str = "links.db";

/// Represents a cablelist project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .cablelist/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project with its config and an empty link database
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::create(root)
    }

    /// Initialize even if .cablelist/ exists; the config is rewritten, an
    /// existing database is kept
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());
        Self::create(root)
    }

    fn create(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };
        std::fs::create_dir_all(project.project_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Database::open(&project.database_path(&Config::default()))?;
        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# cablelist project configuration

# Link database (relative to the project root)
# database: .cablelist/links.db

# Default output format (auto, tsv, json, yaml)
# default_format: auto

# Log filter (error, warn, info, debug, trace); RUST_LOG takes precedence
# log: warn
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .cablelist configuration directory
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.project_dir().join("config.yaml")
    }

    /// Database file configured for this project
    pub fn database_path(&self, config: &Config) -> PathBuf {
        match &config.database {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.root.join(path),
            None => self.project_dir().join(DATABASE_FILE),
        }
    }

    /// Open the project's link database
    pub fn open_database(&self, config: &Config) -> Result<Database, CableListError> {
        Database::open(&self.database_path(config))
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a cablelist project (searched from {searched_from:?}). Run 'cablelist init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("cablelist project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("could not create the link database: {0}")]
    Database(#[from] CableListError),
}
