//! Registered design versions
//!
//! Registering a version starts it from the state of the previous one: every
//! link still present there is carried over as `EXISTS`, together with its
//! vehicle type assignments.

use std::collections::BTreeSet;

use rusqlite::{params, Connection, OptionalExtension, Transaction};

use super::in_transaction;
use super::link::insert_history;
use super::vehicle_type_link::VehicleTypeLinks;
use crate::core::error::Result;
use crate::core::keys::{LinkVersion, ModificationKind};
use crate::core::link_key::LinkPk;

/// Version registry
pub struct LinkVersionStore<'db> {
    conn: &'db mut Connection,
}

impl<'db> LinkVersionStore<'db> {
    pub(crate) fn new(conn: &'db mut Connection) -> Self {
        Self { conn }
    }

    /// Register `version` and carry over the links of the previous version
    ///
    /// Returns the number of history entries carried over.
    pub fn add(&mut self, version: LinkVersion) -> Result<usize> {
        let carried = in_transaction(self.conn, |tx| Self::add_in(tx, version))?;
        tracing::info!(%version, carried, "registered version");
        Ok(carried)
    }

    pub fn add_in(tx: &Transaction<'_>, version: LinkVersion) -> Result<usize> {
        tx.execute(
            "INSERT INTO LinkVersion_tbl (Version_PK, Version) VALUES (?1, ?2)",
            params![version, version.as_decimal()],
        )?;

        let Some(previous) = previous_version(tx, version)? else {
            return Ok(0);
        };

        let kept = {
            let mut stmt = tx.prepare(
                "SELECT UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK,
                        Version_FK, Modification_Code_FK
                 FROM LinkModification_tbl
                 WHERE Version_FK = ?1 AND Modification_Code_FK NOT IN (?2, ?3)
                 ORDER BY UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK",
            )?;
            let rows = stmt.query_map(
                params![previous, ModificationKind::Rem, ModificationKind::ModRem],
                |row| {
                    Ok(LinkPk {
                        connection_start: row.get(0)?,
                        connection_end: row.get(1)?,
                        version: row.get(2)?,
                        modification: row.get(3)?,
                    })
                },
            )?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        // A pair can have more than one live entry in the previous version
        let mut pairs = BTreeSet::new();
        for key in &kept {
            if !pairs.insert((key.connection_start, key.connection_end)) {
                continue;
            }
            let existing = key.with_history(version, ModificationKind::Exists);
            insert_history(tx, &existing)?;
            VehicleTypeLinks::copy_in(tx, key, &existing)?;
        }
        let carried = pairs.len();
        tracing::debug!(%version, %previous, carried, "carried over links");
        Ok(carried)
    }

    /// Registered versions, oldest first
    pub fn list(&self) -> Result<Vec<LinkVersion>> {
        let mut stmt = self
            .conn
            .prepare("SELECT Version_PK FROM LinkVersion_tbl ORDER BY Version_PK")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn latest(&self) -> Result<Option<LinkVersion>> {
        let latest = self
            .conn
            .query_row(
                "SELECT Version_PK FROM LinkVersion_tbl ORDER BY Version_PK DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(latest)
    }

    /// Unregister a version; fails while links still refer to it
    ///
    /// Returns whether the version was registered.
    pub fn remove(&mut self, version: LinkVersion) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM LinkVersion_tbl WHERE Version_PK = ?1",
            params![version],
        )?;
        tracing::info!(%version, removed, "removed version");
        Ok(removed > 0)
    }
}

fn previous_version(conn: &Connection, version: LinkVersion) -> Result<Option<LinkVersion>> {
    let previous = conn
        .query_row(
            "SELECT Version_PK FROM LinkVersion_tbl
             WHERE Version_PK < ?1 ORDER BY Version_PK DESC LIMIT 1",
            params![version],
            |row| row.get(0),
        )
        .optional()?;
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CableListError;
    use crate::core::keys::VehicleTypeId;
    use crate::core::store::fixture::{cable_link, version, Fixture};
    use crate::core::store::VehicleTypePair;

    fn one_pair(start: i64, end: i64) -> BTreeSet<VehicleTypePair> {
        BTreeSet::from([VehicleTypePair::new(
            VehicleTypeId::new(start),
            VehicleTypeId::new(end),
        )])
    }

    #[test]
    fn test_list_and_latest() {
        let mut fx = Fixture::new();
        let mut versions = fx.db.versions();
        assert_eq!(versions.list().unwrap(), vec![version(1.0), version(2.0)]);
        assert_eq!(versions.latest().unwrap(), Some(version(2.0)));

        versions.add(version(1.5)).unwrap();
        assert_eq!(
            versions.list().unwrap(),
            vec![version(1.0), version(1.5), version(2.0)]
        );
        assert_eq!(versions.latest().unwrap(), Some(version(2.0)));
    }

    #[test]
    fn test_duplicate_version_is_storage_error() {
        let mut fx = Fixture::new();
        let err = fx.db.versions().add(version(1.0));
        assert!(matches!(err, Err(CableListError::Storage(_))));
    }

    #[test]
    fn test_new_version_carries_live_links() {
        let mut fx = Fixture::new();
        let new = fx.key(0, 1, 2.0, ModificationKind::New);
        let removed = fx.key(1, 2, 2.0, ModificationKind::Rem);
        let mod_removed = fx.key(2, 3, 2.0, ModificationKind::ModRem);
        let mod_added = mod_removed.with_history(version(2.0), ModificationKind::ModNew);
        for (key, vt) in [(new, 1), (removed, 2), (mod_removed, 3), (mod_added, 4)] {
            fx.db.links().add(&cable_link(key, "W"), &one_pair(vt, vt)).unwrap();
        }

        let carried = fx.db.versions().add(version(3.0)).unwrap();
        assert_eq!(carried, 2);

        let links = fx.db.links();
        let in_v3: Vec<LinkPk> = links
            .list(Some(version(3.0)))
            .unwrap()
            .into_iter()
            .map(|d| d.key)
            .collect();
        assert_eq!(
            in_v3,
            vec![
                new.with_history(version(3.0), ModificationKind::Exists),
                mod_added.with_history(version(3.0), ModificationKind::Exists),
            ]
        );

        let assignments = fx.db.vehicle_type_links();
        assert_eq!(
            assignments
                .get_assigned(&new.with_history(version(3.0), ModificationKind::Exists))
                .unwrap(),
            one_pair(1, 1)
        );
        assert_eq!(
            assignments
                .get_assigned(&mod_added.with_history(version(3.0), ModificationKind::Exists))
                .unwrap(),
            one_pair(4, 4)
        );
    }

    #[test]
    fn test_first_version_carries_nothing() {
        let mut db = crate::core::store::Database::open_in_memory().unwrap();
        assert_eq!(db.versions().add(version(1.0)).unwrap(), 0);
    }

    #[test]
    fn test_remove_referenced_version_fails() {
        let mut fx = Fixture::new();
        let key = fx.key(0, 1, 1.0, ModificationKind::New);
        fx.db.links().add(&cable_link(key, "W1"), &BTreeSet::new()).unwrap();

        let err = fx.db.versions().remove(version(1.0));
        assert!(matches!(err, Err(CableListError::Storage(_))));

        let mut versions = fx.db.versions();
        assert!(versions.remove(version(2.0)).unwrap());
        assert!(!versions.remove(version(9.0)).unwrap());
        assert_eq!(versions.list().unwrap(), vec![version(1.0)]);
    }
}
