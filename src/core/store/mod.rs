//! SQLite-backed link database
//!
//! This module owns the connection to the cable list database and hands out
//! the stores that operate on it:
//! - [`LinkStore`] - links and their modification history
//! - [`VehicleTypeLinks`] - vehicle type assignments of a link
//! - [`ArticleLinks`] - article link templates (read-only)
//! - [`DerivationEngine`] - links derived from article link templates
//! - [`LinkVersionStore`] - registered design versions
//! - [`Catalog`] - units, connections and vehicle types the links refer to
//!
//! Multi-statement operations come in two flavours: `op()` opens and commits
//! its own transaction, `op_in(&tx, ..)` runs inside a transaction the caller
//! already holds (see [`Database::transaction`]). An uncommitted transaction
//! rolls back when dropped, including on early `?` returns.

pub mod article_link;
pub mod catalog;
pub mod derivation;
pub mod link;
mod schema;
pub mod vehicle_type_link;
pub mod version;

pub use article_link::{ArticleLink, ArticleLinks};
pub use catalog::Catalog;
pub use derivation::{DerivationEngine, Materialized, TemplateMatch};
pub use link::LinkStore;
pub use vehicle_type_link::{
    pairs_from_lists, AssignmentDiff, KeyedAssignment, VehicleTypeLinks, VehicleTypePair,
};
pub use version::LinkVersionStore;

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, Transaction};
use serde::Serialize;

use crate::core::error::{CableListError, Result};

/// Current schema version - opening a database with another version fails
pub(crate) const SCHEMA_VERSION: i32 = 1;

/// The cable list database
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

/// Row counts of the link tables
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseStats {
    pub links: usize,
    pub history_entries: usize,
    pub vehicle_type_assignments: usize,
    pub versions: usize,
    pub article_links: usize,
    pub db_size_bytes: u64,
}

impl Database {
    /// Open or create the database file at `path`
    ///
    /// A new file gets the full schema. An existing file must carry the
    /// current schema version.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let mut db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.prepare()?;

        tracing::debug!(path = %path.display(), "opened link database");
        Ok(db)
    }

    /// Open a private in-memory database (tests, dry runs)
    pub fn open_in_memory() -> Result<Self> {
        let mut db = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        db.prepare()?;
        Ok(db)
    }

    fn prepare(&mut self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        if self.has_schema()? {
            self.check_schema_version()
        } else {
            self.init_schema()
        }
    }

    fn has_schema(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn check_schema_version(&self) -> Result<()> {
        let found: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        if found != SCHEMA_VERSION {
            return Err(CableListError::SchemaMismatch {
                found,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(())
    }

    /// Database file, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read access to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin an outer transaction for composing `*_in` operations
    ///
    /// The transaction rolls back when dropped unless `commit()` is called.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    pub fn links(&mut self) -> LinkStore<'_> {
        LinkStore::new(&mut self.conn)
    }

    pub fn vehicle_type_links(&mut self) -> VehicleTypeLinks<'_> {
        VehicleTypeLinks::new(&mut self.conn)
    }

    pub fn article_links(&self) -> ArticleLinks<'_> {
        ArticleLinks::new(&self.conn)
    }

    pub fn derivation(&mut self) -> DerivationEngine<'_> {
        DerivationEngine::new(&mut self.conn)
    }

    pub fn versions(&mut self) -> LinkVersionStore<'_> {
        LinkVersionStore::new(&mut self.conn)
    }

    pub fn catalog(&mut self) -> Catalog<'_> {
        Catalog::new(&mut self.conn)
    }

    /// Get database statistics
    pub fn statistics(&self) -> Result<DatabaseStats> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(n as usize)
        };

        let db_size_bytes = self
            .path
            .as_ref()
            .and_then(|p| fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(DatabaseStats {
            links: count("Link_tbl")?,
            history_entries: count("LinkModification_tbl")?,
            vehicle_type_assignments: count("VehicleType_Link_tbl")?,
            versions: count("LinkVersion_tbl")?,
            article_links: count("ArticleLink_tbl")?,
            db_size_bytes,
        })
    }
}

/// Run `f` inside a transaction owned by this call
///
/// Commits when `f` succeeds; otherwise the transaction is dropped, which
/// rolls it back.
pub(crate) fn in_transaction<T>(
    conn: &mut Connection,
    f: impl FnOnce(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
    let tx = conn.transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}
