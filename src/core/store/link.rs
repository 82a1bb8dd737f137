//! Link rows and their modification history
//!
//! A connection pair owns one row in `Link_tbl` (its attributes) and one row
//! in `LinkModification_tbl` per history entry. The [`LinkPk`] of a link names
//! one history entry; vehicle type assignments hang off that entry.

use std::collections::BTreeSet;

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use super::in_transaction;
use super::vehicle_type_link::{VehicleTypeLinks, VehicleTypePair};
use crate::core::error::Result;
use crate::core::keys::{LinkVersion, UnitConnectionId};
use crate::core::link::{ArticleLinkRef, LinkAttributes, LinkData};
use crate::core::link_key::LinkPk;

const LINK_COLUMNS: &str = "m.UnitConnectionStart_Id_FK, m.UnitConnectionEnd_Id_FK, \
     m.Version_FK, m.Modification_Code_FK, l.LinkType_Code_FK, l.LinkDirection_Code_FK, \
     l.ArticleConnectionStart_Id_FK, l.ArticleConnectionEnd_Id_FK, l.Wire_Id_FK, \
     l.Identification, l.Resistance, l.Length, l.Remarks";

const LINK_JOIN: &str = "LinkModification_tbl m \
     JOIN Link_tbl l ON l.UnitConnectionStart_Id_FK = m.UnitConnectionStart_Id_FK \
                    AND l.UnitConnectionEnd_Id_FK = m.UnitConnectionEnd_Id_FK \
     JOIN Modification_tbl mt ON mt.Code_PK = m.Modification_Code_FK";

/// Link store
pub struct LinkStore<'db> {
    conn: &'db mut Connection,
}

impl<'db> LinkStore<'db> {
    pub(crate) fn new(conn: &'db mut Connection) -> Self {
        Self { conn }
    }

    /// Add a link history entry with its vehicle type assignments
    ///
    /// The attribute row of the pair is created, or replaced when the pair
    /// already has one.
    pub fn add(&mut self, data: &LinkData, vehicle_types: &BTreeSet<VehicleTypePair>) -> Result<()> {
        in_transaction(self.conn, |tx| Self::add_in(tx, data, vehicle_types))?;
        tracing::info!(key = %data.key, "added link");
        Ok(())
    }

    pub fn add_in(
        tx: &Transaction<'_>,
        data: &LinkData,
        vehicle_types: &BTreeSet<VehicleTypePair>,
    ) -> Result<()> {
        upsert_attributes(tx, data)?;
        insert_history(tx, &data.key)?;
        VehicleTypeLinks::reconcile_in(tx, &data.key, vehicle_types)?;
        Ok(())
    }

    /// Add several links in one transaction; any failure adds none of them
    pub fn add_many(&mut self, links: &[(LinkData, BTreeSet<VehicleTypePair>)]) -> Result<()> {
        in_transaction(self.conn, |tx| {
            for (data, vehicle_types) in links {
                Self::add_in(tx, data, vehicle_types)?;
            }
            Ok(())
        })?;
        tracing::info!(count = links.len(), "added links");
        Ok(())
    }

    /// Get the link stored under `key`
    pub fn get(&self, key: &LinkPk) -> Result<Option<LinkData>> {
        get(self.conn, key)
    }

    pub fn exists(&self, key: &LinkPk) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Replace the link stored under `old_key` with `new_data`
    ///
    /// When the connection pair changes the old link is removed and the new
    /// one added; key columns are never updated in place.
    pub fn update(
        &mut self,
        old_key: &LinkPk,
        new_data: &LinkData,
        vehicle_types: &BTreeSet<VehicleTypePair>,
    ) -> Result<()> {
        in_transaction(self.conn, |tx| {
            Self::update_in(tx, old_key, new_data, vehicle_types)
        })?;
        tracing::info!(old = %old_key, new = %new_data.key, "updated link");
        Ok(())
    }

    pub fn update_in(
        tx: &Transaction<'_>,
        old_key: &LinkPk,
        new_data: &LinkData,
        vehicle_types: &BTreeSet<VehicleTypePair>,
    ) -> Result<()> {
        let new_key = &new_data.key;

        if !old_key.same_pair(new_key) {
            tracing::debug!(old = %old_key, new = %new_key, "connection pair changed");
            Self::remove_in(tx, old_key)?;
            return Self::add_in(tx, new_data, vehicle_types);
        }

        VehicleTypeLinks::remove_all_in(tx, old_key)?;
        delete_history(tx, old_key)?;
        insert_history(tx, new_key)?;
        VehicleTypeLinks::reconcile_in(tx, new_key, vehicle_types)?;
        update_attributes(tx, new_data)?;
        Ok(())
    }

    /// Remove a link with its whole history and every assignment
    ///
    /// Removing a link that does not exist is not an error.
    pub fn remove(&mut self, key: &LinkPk) -> Result<()> {
        in_transaction(self.conn, |tx| Self::remove_in(tx, key))?;
        tracing::info!(key = %key, "removed link");
        Ok(())
    }

    pub fn remove_in(tx: &Transaction<'_>, key: &LinkPk) -> Result<()> {
        let assignments = VehicleTypeLinks::remove_for_pair_in(tx, key)?;
        let history = tx.execute(
            "DELETE FROM LinkModification_tbl
             WHERE UnitConnectionStart_Id_FK = ?1 AND UnitConnectionEnd_Id_FK = ?2",
            params![key.connection_start, key.connection_end],
        )?;
        let links = tx.execute(
            "DELETE FROM Link_tbl
             WHERE UnitConnectionStart_Id_FK = ?1 AND UnitConnectionEnd_Id_FK = ?2",
            params![key.connection_start, key.connection_end],
        )?;
        tracing::debug!(key = %key, assignments, history, links, "deleted link rows");
        Ok(())
    }

    /// Remove several links in one transaction
    pub fn remove_many(&mut self, keys: &[LinkPk]) -> Result<()> {
        in_transaction(self.conn, |tx| {
            for key in keys {
                Self::remove_in(tx, key)?;
            }
            Ok(())
        })?;
        tracing::info!(count = keys.len(), "removed links");
        Ok(())
    }

    /// Every history entry of a connection pair, by version then modification
    pub fn history(&self, start: UnitConnectionId, end: UnitConnectionId) -> Result<Vec<LinkPk>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT m.UnitConnectionStart_Id_FK, m.UnitConnectionEnd_Id_FK,
                    m.Version_FK, m.Modification_Code_FK
             FROM {LINK_JOIN}
             WHERE m.UnitConnectionStart_Id_FK = ?1 AND m.UnitConnectionEnd_Id_FK = ?2
             ORDER BY m.Version_FK, mt.SortOrder"
        ))?;
        let rows = stmt.query_map(params![start, end], row_to_key)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Links of one version, or of every version
    pub fn list(&self, version: Option<LinkVersion>) -> Result<Vec<LinkData>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LINK_COLUMNS}
             FROM {LINK_JOIN}
             WHERE ?1 IS NULL OR m.Version_FK = ?1
             ORDER BY m.Version_FK, m.UnitConnectionStart_Id_FK,
                      m.UnitConnectionEnd_Id_FK, mt.SortOrder"
        ))?;
        let rows = stmt.query_map(params![version], row_to_link)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Most recent history entry of a connection pair
    pub fn latest(&self, start: UnitConnectionId, end: UnitConnectionId) -> Result<Option<LinkPk>> {
        latest_key(self.conn, start, end)
    }
}

pub(crate) fn get(conn: &Connection, key: &LinkPk) -> Result<Option<LinkData>> {
    let data = conn
        .query_row(
            &format!(
                "SELECT {LINK_COLUMNS}
                 FROM {LINK_JOIN}
                 WHERE m.UnitConnectionStart_Id_FK = ?1 AND m.UnitConnectionEnd_Id_FK = ?2
                   AND m.Version_FK = ?3 AND m.Modification_Code_FK = ?4"
            ),
            params![
                key.connection_start,
                key.connection_end,
                key.version,
                key.modification
            ],
            row_to_link,
        )
        .optional()?;
    Ok(data)
}

pub(crate) fn latest_key(
    conn: &Connection,
    start: UnitConnectionId,
    end: UnitConnectionId,
) -> Result<Option<LinkPk>> {
    let key = conn
        .query_row(
            &format!(
                "SELECT m.UnitConnectionStart_Id_FK, m.UnitConnectionEnd_Id_FK,
                        m.Version_FK, m.Modification_Code_FK
                 FROM {LINK_JOIN}
                 WHERE m.UnitConnectionStart_Id_FK = ?1 AND m.UnitConnectionEnd_Id_FK = ?2
                 ORDER BY m.Version_FK DESC, mt.SortOrder DESC
                 LIMIT 1"
            ),
            params![start, end],
            row_to_key,
        )
        .optional()?;
    Ok(key)
}

fn row_to_key(row: &Row<'_>) -> rusqlite::Result<LinkPk> {
    Ok(LinkPk {
        connection_start: row.get(0)?,
        connection_end: row.get(1)?,
        version: row.get(2)?,
        modification: row.get(3)?,
    })
}

fn row_to_link(row: &Row<'_>) -> rusqlite::Result<LinkData> {
    let article_link = match (row.get(6)?, row.get(7)?) {
        (Some(connection_start), Some(connection_end)) => Some(ArticleLinkRef {
            connection_start,
            connection_end,
        }),
        _ => None,
    };
    Ok(LinkData {
        key: row_to_key(row)?,
        attributes: LinkAttributes {
            link_type: row.get(4)?,
            direction: row.get(5)?,
            article_link,
            wire: row.get(8)?,
            identification: row.get(9)?,
            resistance: row.get(10)?,
            length: row.get(11)?,
            remarks: row.get(12)?,
        },
    })
}

fn upsert_attributes(tx: &Transaction<'_>, data: &LinkData) -> Result<()> {
    let a = &data.attributes;
    tx.execute(
        "INSERT INTO Link_tbl (
            UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK,
            LinkType_Code_FK, LinkDirection_Code_FK,
            ArticleConnectionStart_Id_FK, ArticleConnectionEnd_Id_FK, Wire_Id_FK,
            Identification, Resistance, Length, Remarks
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT (UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK) DO UPDATE SET
            LinkType_Code_FK = excluded.LinkType_Code_FK,
            LinkDirection_Code_FK = excluded.LinkDirection_Code_FK,
            ArticleConnectionStart_Id_FK = excluded.ArticleConnectionStart_Id_FK,
            ArticleConnectionEnd_Id_FK = excluded.ArticleConnectionEnd_Id_FK,
            Wire_Id_FK = excluded.Wire_Id_FK,
            Identification = excluded.Identification,
            Resistance = excluded.Resistance,
            Length = excluded.Length,
            Remarks = excluded.Remarks",
        params![
            data.key.connection_start,
            data.key.connection_end,
            a.link_type,
            a.direction,
            a.article_link.map(|r| r.connection_start),
            a.article_link.map(|r| r.connection_end),
            a.wire,
            a.identification,
            a.resistance,
            a.length,
            a.remarks,
        ],
    )?;
    tracing::debug!(key = %data.key, "wrote link attributes");
    Ok(())
}

fn update_attributes(tx: &Transaction<'_>, data: &LinkData) -> Result<()> {
    let a = &data.attributes;
    tx.execute(
        "UPDATE Link_tbl SET
            LinkType_Code_FK = ?3,
            LinkDirection_Code_FK = ?4,
            ArticleConnectionStart_Id_FK = ?5,
            ArticleConnectionEnd_Id_FK = ?6,
            Wire_Id_FK = ?7,
            Identification = ?8,
            Resistance = ?9,
            Length = ?10,
            Remarks = ?11
         WHERE UnitConnectionStart_Id_FK = ?1 AND UnitConnectionEnd_Id_FK = ?2",
        params![
            data.key.connection_start,
            data.key.connection_end,
            a.link_type,
            a.direction,
            a.article_link.map(|r| r.connection_start),
            a.article_link.map(|r| r.connection_end),
            a.wire,
            a.identification,
            a.resistance,
            a.length,
            a.remarks,
        ],
    )?;
    tracing::debug!(key = %data.key, "updated link attributes");
    Ok(())
}

pub(crate) fn insert_history(tx: &Transaction<'_>, key: &LinkPk) -> Result<()> {
    tx.execute(
        "INSERT INTO LinkModification_tbl (
            UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK,
            Version_FK, Modification_Code_FK
         ) VALUES (?1, ?2, ?3, ?4)",
        params![
            key.connection_start,
            key.connection_end,
            key.version,
            key.modification
        ],
    )?;
    tracing::debug!(key = %key, "inserted history entry");
    Ok(())
}

fn delete_history(tx: &Transaction<'_>, key: &LinkPk) -> Result<()> {
    let deleted = tx.execute(
        "DELETE FROM LinkModification_tbl
         WHERE UnitConnectionStart_Id_FK = ?1 AND UnitConnectionEnd_Id_FK = ?2
           AND Version_FK = ?3 AND Modification_Code_FK = ?4",
        params![
            key.connection_start,
            key.connection_end,
            key.version,
            key.modification
        ],
    )?;
    tracing::debug!(key = %key, deleted, "deleted history entry");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CableListError;
    use crate::core::keys::{ModificationKind, VehicleTypeId};
    use crate::core::store::fixture::{cable_link, version, Fixture};

    fn pairs(list: &[(i64, i64)]) -> BTreeSet<VehicleTypePair> {
        list.iter()
            .map(|(s, e)| VehicleTypePair::new(VehicleTypeId::new(*s), VehicleTypeId::new(*e)))
            .collect()
    }

    #[test]
    fn test_add_and_get() {
        let mut fx = Fixture::new();
        let key = fx.key(0, 1, 1.0, ModificationKind::New);
        let data = cable_link(key, "W1");

        fx.db.links().add(&data, &pairs(&[(1, 2)])).unwrap();

        let links = fx.db.links();
        assert_eq!(links.get(&key).unwrap(), Some(data));
        assert!(links.exists(&key).unwrap());
        assert_eq!(
            fx.db.vehicle_type_links().get_assigned(&key).unwrap(),
            pairs(&[(1, 2)])
        );
    }

    #[test]
    fn test_get_missing_is_none() {
        let mut fx = Fixture::new();
        let key = fx.key(0, 1, 1.0, ModificationKind::New);
        assert_eq!(fx.db.links().get(&key).unwrap(), None);
    }

    #[test]
    fn test_remove_then_get_is_none() {
        let mut fx = Fixture::new();
        let key = fx.key(0, 1, 1.0, ModificationKind::New);
        let data = cable_link(key, "W1");
        fx.db.links().add(&data, &pairs(&[(1, 2), (3, 4)])).unwrap();

        fx.db.links().remove(&key).unwrap();

        assert_eq!(fx.db.links().get(&key).unwrap(), None);
        let stats = fx.db.statistics().unwrap();
        assert_eq!(stats.links, 0);
        assert_eq!(stats.history_entries, 0);
        assert_eq!(stats.vehicle_type_assignments, 0);
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let mut fx = Fixture::new();
        let key = fx.key(2, 3, 1.0, ModificationKind::New);
        fx.db.links().remove(&key).unwrap();
    }

    #[test]
    fn test_remove_drops_whole_history() {
        let mut fx = Fixture::new();
        let first = fx.key(0, 1, 1.0, ModificationKind::New);
        let second = first.with_history(version(2.0), ModificationKind::Exists);
        fx.db.links().add(&cable_link(first, "W1"), &pairs(&[(1, 1)])).unwrap();
        fx.db.links().add(&cable_link(second, "W1"), &pairs(&[(2, 2)])).unwrap();
        assert_eq!(fx.db.statistics().unwrap().history_entries, 2);

        fx.db.links().remove(&second).unwrap();

        let links = fx.db.links();
        assert_eq!(links.get(&first).unwrap(), None);
        assert_eq!(links.get(&second).unwrap(), None);
        assert_eq!(fx.db.statistics().unwrap().vehicle_type_assignments, 0);
    }

    #[test]
    fn test_identity_changing_update_is_delete_insert() {
        let mut fx = Fixture::new();
        let old_key = fx.key(0, 1, 1.0, ModificationKind::New);
        fx.db
            .links()
            .add(&cable_link(old_key, "W1"), &pairs(&[(1, 2)]))
            .unwrap();

        let new_key = fx.key(2, 1, 1.0, ModificationKind::New);
        let new_data = cable_link(new_key, "W2");
        fx.db
            .links()
            .update(&old_key, &new_data, &pairs(&[(3, 4)]))
            .unwrap();

        let links = fx.db.links();
        assert_eq!(links.get(&old_key).unwrap(), None);
        assert_eq!(links.get(&new_key).unwrap(), Some(new_data));
        assert_eq!(links.history(old_key.connection_start, old_key.connection_end).unwrap(), vec![]);

        let mut assignments = fx.db.vehicle_type_links();
        assert!(assignments.get_assigned(&old_key).unwrap().is_empty());
        assert_eq!(assignments.get_assigned(&new_key).unwrap(), pairs(&[(3, 4)]));
        assert_eq!(assignments.remove_all(&old_key).unwrap().removed.len(), 0);
    }

    #[test]
    fn test_attribute_only_update_keeps_key() {
        let mut fx = Fixture::new();
        let key = fx.key(0, 1, 1.0, ModificationKind::Exists);
        let mut data = cable_link(key, "W1");
        fx.db.links().add(&data, &pairs(&[(1, 2)])).unwrap();

        data.attributes.identification = Some("W1-renamed".to_string());
        data.attributes.remarks = Some("rerouted".to_string());
        fx.db.links().update(&key, &data, &pairs(&[(1, 2)])).unwrap();

        let stored = fx.db.links().get(&key).unwrap().unwrap();
        assert_eq!(stored.key.version, version(1.0));
        assert_eq!(stored.key.modification, ModificationKind::Exists);
        assert_eq!(stored.attributes.identification.as_deref(), Some("W1-renamed"));
        assert_eq!(stored.attributes.remarks.as_deref(), Some("rerouted"));
        assert_eq!(
            fx.db.vehicle_type_links().get_assigned(&key).unwrap(),
            pairs(&[(1, 2)])
        );
    }

    #[test]
    fn test_update_moves_history_entry() {
        let mut fx = Fixture::new();
        let old_key = fx.key(0, 1, 1.0, ModificationKind::New);
        fx.db
            .links()
            .add(&cable_link(old_key, "W1"), &pairs(&[(1, 2)]))
            .unwrap();

        let new_key = old_key.with_history(version(2.0), ModificationKind::ModNew);
        fx.db
            .links()
            .update(&old_key, &cable_link(new_key, "W1"), &pairs(&[(5, 6)]))
            .unwrap();

        let links = fx.db.links();
        assert_eq!(links.get(&old_key).unwrap(), None);
        assert!(links.get(&new_key).unwrap().is_some());
        assert_eq!(
            links.history(new_key.connection_start, new_key.connection_end).unwrap(),
            vec![new_key]
        );
        let assignments = fx.db.vehicle_type_links();
        assert!(assignments.get_assigned(&old_key).unwrap().is_empty());
        assert_eq!(assignments.get_assigned(&new_key).unwrap(), pairs(&[(5, 6)]));
    }

    #[test]
    fn test_duplicate_add_rolls_back() {
        let mut fx = Fixture::new();
        let key = fx.key(0, 1, 1.0, ModificationKind::New);
        fx.db.links().add(&cable_link(key, "W1"), &BTreeSet::new()).unwrap();

        let err = fx
            .db
            .links()
            .add(&cable_link(key, "W2"), &pairs(&[(1, 2)]))
            .unwrap_err();
        assert!(matches!(err, CableListError::Storage(_)));

        let stored = fx.db.links().get(&key).unwrap().unwrap();
        assert_eq!(stored.attributes.identification.as_deref(), Some("W1"));
        assert!(fx.db.vehicle_type_links().get_assigned(&key).unwrap().is_empty());
    }

    #[test]
    fn test_add_many_is_all_or_nothing() {
        let mut fx = Fixture::new();
        let a = fx.key(0, 1, 1.0, ModificationKind::New);
        let b = fx.key(2, 3, 1.0, ModificationKind::New);
        let batch = vec![
            (cable_link(a, "W1"), pairs(&[(1, 2)])),
            (cable_link(b, "W2"), BTreeSet::new()),
        ];
        fx.db.links().add_many(&batch).unwrap();
        assert_eq!(fx.db.statistics().unwrap().links, 2);
        assert_eq!(fx.db.vehicle_type_links().get_assigned(&a).unwrap(), pairs(&[(1, 2)]));

        // The last entry repeats `b`, so the whole batch is rejected
        let c = fx.key(1, 2, 1.0, ModificationKind::New);
        let batch = vec![
            (cable_link(c, "W3"), pairs(&[(3, 4)])),
            (cable_link(b, "W4"), BTreeSet::new()),
        ];
        let err = fx.db.links().add_many(&batch);
        assert!(matches!(err, Err(CableListError::Storage(_))));
        assert!(!fx.db.links().exists(&c).unwrap());
        assert!(fx.db.vehicle_type_links().get_assigned(&c).unwrap().is_empty());
        let stored = fx.db.links().get(&b).unwrap().unwrap();
        assert_eq!(stored.attributes.identification.as_deref(), Some("W2"));
    }

    #[test]
    fn test_failed_update_keeps_old_state() {
        let mut fx = Fixture::new();
        let a = fx.key(0, 1, 1.0, ModificationKind::New);
        let b = a.with_history(version(2.0), ModificationKind::ModRem);
        fx.db.links().add(&cable_link(a, "W1"), &pairs(&[(1, 2)])).unwrap();
        fx.db.links().add(&cable_link(b, "W1"), &BTreeSet::new()).unwrap();

        // Moving `a` onto the existing history entry `b` violates its key
        let err = fx
            .db
            .links()
            .update(&a, &cable_link(b, "W9"), &pairs(&[(3, 4)]));
        assert!(matches!(err, Err(CableListError::Storage(_))));

        let stored = fx.db.links().get(&a).unwrap().unwrap();
        assert_eq!(stored.attributes.identification.as_deref(), Some("W1"));
        let assignments = fx.db.vehicle_type_links();
        assert_eq!(assignments.get_assigned(&a).unwrap(), pairs(&[(1, 2)]));
        assert!(assignments.get_assigned(&b).unwrap().is_empty());
    }

    #[test]
    fn test_unregistered_version_is_storage_error() {
        let mut fx = Fixture::new();
        let key = fx.key(0, 1, 7.0, ModificationKind::New);
        let err = fx.db.links().add(&cable_link(key, "W1"), &BTreeSet::new());
        assert!(matches!(err, Err(CableListError::Storage(_))));
        assert_eq!(fx.db.statistics().unwrap().links, 0);
    }

    #[test]
    fn test_remove_many_in_one_transaction() {
        let mut fx = Fixture::new();
        let a = fx.key(0, 1, 1.0, ModificationKind::New);
        let b = fx.key(2, 3, 1.0, ModificationKind::New);
        fx.db.links().add(&cable_link(a, "W1"), &pairs(&[(1, 2)])).unwrap();
        fx.db.links().add(&cable_link(b, "W2"), &pairs(&[(1, 2)])).unwrap();

        fx.db.links().remove_many(&[a, b]).unwrap();
        assert_eq!(fx.db.statistics().unwrap().links, 0);
    }

    #[test]
    fn test_outer_transaction_composes_operations() {
        let mut fx = Fixture::new();
        let a = fx.key(0, 1, 1.0, ModificationKind::New);
        let b = fx.key(2, 3, 1.0, ModificationKind::New);
        let data_a = cable_link(a, "W1");
        let data_b = cable_link(b, "W2");

        {
            let tx = fx.db.transaction().unwrap();
            LinkStore::add_in(&tx, &data_a, &BTreeSet::new()).unwrap();
            LinkStore::add_in(&tx, &data_b, &BTreeSet::new()).unwrap();
            // dropped without commit
        }
        assert_eq!(fx.db.statistics().unwrap().links, 0);

        let tx = fx.db.transaction().unwrap();
        LinkStore::add_in(&tx, &data_a, &BTreeSet::new()).unwrap();
        LinkStore::add_in(&tx, &data_b, &BTreeSet::new()).unwrap();
        tx.commit().unwrap();
        assert_eq!(fx.db.statistics().unwrap().links, 2);
    }

    #[test]
    fn test_history_and_list_order() {
        let mut fx = Fixture::new();
        let new = fx.key(0, 1, 1.0, ModificationKind::New);
        let removed = new.with_history(version(2.0), ModificationKind::ModRem);
        let added = new.with_history(version(2.0), ModificationKind::ModNew);
        let other = fx.key(2, 3, 2.0, ModificationKind::New);
        for key in [added, new, removed, other] {
            fx.db.links().add(&cable_link(key, "W"), &BTreeSet::new()).unwrap();
        }

        let links = fx.db.links();
        assert_eq!(
            links.history(new.connection_start, new.connection_end).unwrap(),
            vec![new, removed, added]
        );
        assert_eq!(
            links.latest(new.connection_start, new.connection_end).unwrap(),
            Some(added)
        );

        let in_v2: Vec<LinkPk> = links
            .list(Some(version(2.0)))
            .unwrap()
            .into_iter()
            .map(|d| d.key)
            .collect();
        assert_eq!(in_v2, vec![removed, added, other]);
        assert_eq!(links.list(None).unwrap().len(), 4);
    }
}
