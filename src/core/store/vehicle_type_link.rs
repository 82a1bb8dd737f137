//! Vehicle type assignments of a link
//!
//! Every history entry of a link (one [`LinkPk`]) carries the set of vehicle
//! type pairs that use it. The set only changes through [`VehicleTypeLinks::reconcile`],
//! which computes the rows to delete and insert from the ordered-set
//! difference between what is stored and what is expected.

use std::collections::BTreeSet;

use rusqlite::{params, Connection, Transaction};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::in_transaction;
use crate::core::error::Result;
use crate::core::keys::{UnitId, VehicleTypeId};
use crate::core::link_key::LinkPk;

/// Start and end vehicle type of an assignment
///
/// Ordered by start id, then end id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleTypePair {
    pub start: VehicleTypeId,
    pub end: VehicleTypeId,
}

impl VehicleTypePair {
    pub fn new(start: VehicleTypeId, end: VehicleTypeId) -> Self {
        Self { start, end }
    }
}

/// Rows written by one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentDiff {
    pub added: BTreeSet<VehicleTypePair>,
    pub removed: BTreeSet<VehicleTypePair>,
}

impl AssignmentDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Start/end vehicle type lists that can not be paired
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VehicleTypeListError {
    #[error("vehicle type list is empty (starts: {starts}, ends: {ends})")]
    Empty { starts: usize, ends: usize },

    #[error("can not pair {starts} start vehicle types with {ends} end vehicle types")]
    Mismatch { starts: usize, ends: usize },
}

/// Expand start/end vehicle type lists into assignment pairs
///
/// Lists of equal length are paired element by element. A single start is
/// paired with every end, and every start with a single end.
pub fn pairs_from_lists(
    starts: &[VehicleTypeId],
    ends: &[VehicleTypeId],
) -> std::result::Result<BTreeSet<VehicleTypePair>, VehicleTypeListError> {
    let (n_starts, n_ends) = (starts.len(), ends.len());
    if n_starts == 0 || n_ends == 0 {
        return Err(VehicleTypeListError::Empty {
            starts: n_starts,
            ends: n_ends,
        });
    }

    let pairs = if n_starts == n_ends {
        starts
            .iter()
            .zip(ends)
            .map(|(s, e)| VehicleTypePair::new(*s, *e))
            .collect()
    } else if n_starts == 1 {
        ends.iter()
            .map(|e| VehicleTypePair::new(starts[0], *e))
            .collect()
    } else if n_ends == 1 {
        starts
            .iter()
            .map(|s| VehicleTypePair::new(*s, ends[0]))
            .collect()
    } else {
        return Err(VehicleTypeListError::Mismatch {
            starts: n_starts,
            ends: n_ends,
        });
    };
    Ok(pairs)
}

/// An assignment with the history entry it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyedAssignment {
    pub key: LinkPk,
    pub pair: VehicleTypePair,
}

/// Vehicle type assignments store
pub struct VehicleTypeLinks<'db> {
    conn: &'db mut Connection,
}

impl<'db> VehicleTypeLinks<'db> {
    pub(crate) fn new(conn: &'db mut Connection) -> Self {
        Self { conn }
    }

    /// Pairs currently assigned to `key`
    pub fn get_assigned(&self, key: &LinkPk) -> Result<BTreeSet<VehicleTypePair>> {
        get_assigned(self.conn, key)
    }

    /// Make the stored assignments of `key` equal `expected`
    pub fn reconcile(
        &mut self,
        key: &LinkPk,
        expected: &BTreeSet<VehicleTypePair>,
    ) -> Result<AssignmentDiff> {
        in_transaction(self.conn, |tx| Self::reconcile_in(tx, key, expected))
    }

    /// [`VehicleTypeLinks::reconcile`] inside the caller's transaction
    pub fn reconcile_in(
        tx: &Transaction<'_>,
        key: &LinkPk,
        expected: &BTreeSet<VehicleTypePair>,
    ) -> Result<AssignmentDiff> {
        let current = get_assigned(tx, key)?;
        let removed: BTreeSet<VehicleTypePair> = current.difference(expected).copied().collect();
        let added: BTreeSet<VehicleTypePair> = expected.difference(&current).copied().collect();

        if !removed.is_empty() {
            let mut stmt = tx.prepare_cached(
                "DELETE FROM VehicleType_Link_tbl
                 WHERE VehicleTypeStart_Id_FK = ?1 AND VehicleTypeEnd_Id_FK = ?2
                   AND UnitConnectionStart_Id_FK = ?3 AND UnitConnectionEnd_Id_FK = ?4
                   AND Link_Version_FK = ?5 AND Link_Modification_Code_FK = ?6",
            )?;
            for pair in &removed {
                stmt.execute(params![
                    pair.start,
                    pair.end,
                    key.connection_start,
                    key.connection_end,
                    key.version,
                    key.modification,
                ])?;
            }
        }

        if !added.is_empty() {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO VehicleType_Link_tbl (
                    VehicleTypeStart_Id_FK, VehicleTypeEnd_Id_FK,
                    UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK,
                    Link_Version_FK, Link_Modification_Code_FK
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for pair in &added {
                stmt.execute(params![
                    pair.start,
                    pair.end,
                    key.connection_start,
                    key.connection_end,
                    key.version,
                    key.modification,
                ])?;
            }
        }

        tracing::debug!(
            key = %key,
            added = added.len(),
            removed = removed.len(),
            "reconciled vehicle type assignments"
        );
        Ok(AssignmentDiff { added, removed })
    }

    /// Remove every assignment of `key`
    pub fn remove_all(&mut self, key: &LinkPk) -> Result<AssignmentDiff> {
        in_transaction(self.conn, |tx| Self::remove_all_in(tx, key))
    }

    pub fn remove_all_in(tx: &Transaction<'_>, key: &LinkPk) -> Result<AssignmentDiff> {
        Self::reconcile_in(tx, key, &BTreeSet::new())
    }

    /// Assignments of every link with an end on a connection of `unit`
    pub fn get_by_unit(&self, unit: UnitId) -> Result<Vec<KeyedAssignment>> {
        let mut stmt = self.conn.prepare(
            "SELECT v.VehicleTypeStart_Id_FK, v.VehicleTypeEnd_Id_FK,
                    v.UnitConnectionStart_Id_FK, v.UnitConnectionEnd_Id_FK,
                    v.Link_Version_FK, v.Link_Modification_Code_FK
             FROM VehicleType_Link_tbl v
             WHERE EXISTS (
                SELECT 1 FROM UnitConnection_tbl c
                WHERE c.Unit_Id_FK = ?1
                  AND c.Id_PK IN (v.UnitConnectionStart_Id_FK, v.UnitConnectionEnd_Id_FK)
             )
             ORDER BY v.UnitConnectionStart_Id_FK, v.UnitConnectionEnd_Id_FK, v.Link_Version_FK,
                      v.Link_Modification_Code_FK, v.VehicleTypeStart_Id_FK, v.VehicleTypeEnd_Id_FK",
        )?;
        let rows = stmt.query_map(params![unit], |row| {
            Ok(KeyedAssignment {
                pair: VehicleTypePair::new(row.get(0)?, row.get(1)?),
                key: LinkPk {
                    connection_start: row.get(2)?,
                    connection_end: row.get(3)?,
                    version: row.get(4)?,
                    modification: row.get(5)?,
                },
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Remove the assignments [`VehicleTypeLinks::get_by_unit`] lists
    ///
    /// Returns the number of removed rows.
    pub fn remove_by_unit(&mut self, unit: UnitId) -> Result<usize> {
        let removed = in_transaction(self.conn, |tx| Self::remove_by_unit_in(tx, unit))?;
        tracing::info!(%unit, removed, "removed vehicle type assignments of unit");
        Ok(removed)
    }

    pub fn remove_by_unit_in(tx: &Transaction<'_>, unit: UnitId) -> Result<usize> {
        let removed = tx.execute(
            "DELETE FROM VehicleType_Link_tbl
             WHERE EXISTS (
                SELECT 1 FROM UnitConnection_tbl c
                WHERE c.Unit_Id_FK = ?1
                  AND c.Id_PK IN (VehicleType_Link_tbl.UnitConnectionStart_Id_FK,
                                  VehicleType_Link_tbl.UnitConnectionEnd_Id_FK)
             )",
            params![unit],
        )?;
        Ok(removed)
    }

    /// Remove the assignments of every history entry of a connection pair
    pub(crate) fn remove_for_pair_in(tx: &Transaction<'_>, key: &LinkPk) -> Result<usize> {
        let removed = tx.execute(
            "DELETE FROM VehicleType_Link_tbl
             WHERE UnitConnectionStart_Id_FK = ?1 AND UnitConnectionEnd_Id_FK = ?2",
            params![key.connection_start, key.connection_end],
        )?;
        Ok(removed)
    }

    /// Copy the assignments of `from` to `to` (both keys must exist)
    pub(crate) fn copy_in(tx: &Transaction<'_>, from: &LinkPk, to: &LinkPk) -> Result<usize> {
        let copied = tx.execute(
            "INSERT OR IGNORE INTO VehicleType_Link_tbl (
                VehicleTypeStart_Id_FK, VehicleTypeEnd_Id_FK,
                UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK,
                Link_Version_FK, Link_Modification_Code_FK
             )
             SELECT VehicleTypeStart_Id_FK, VehicleTypeEnd_Id_FK, ?5, ?6, ?7, ?8
             FROM VehicleType_Link_tbl
             WHERE UnitConnectionStart_Id_FK = ?1 AND UnitConnectionEnd_Id_FK = ?2
               AND Link_Version_FK = ?3 AND Link_Modification_Code_FK = ?4",
            params![
                from.connection_start,
                from.connection_end,
                from.version,
                from.modification,
                to.connection_start,
                to.connection_end,
                to.version,
                to.modification,
            ],
        )?;
        Ok(copied)
    }
}

pub(crate) fn get_assigned(conn: &Connection, key: &LinkPk) -> Result<BTreeSet<VehicleTypePair>> {
    let mut stmt = conn.prepare_cached(
        "SELECT VehicleTypeStart_Id_FK, VehicleTypeEnd_Id_FK
         FROM VehicleType_Link_tbl
         WHERE UnitConnectionStart_Id_FK = ?1 AND UnitConnectionEnd_Id_FK = ?2
           AND Link_Version_FK = ?3 AND Link_Modification_Code_FK = ?4",
    )?;
    let rows = stmt.query_map(
        params![
            key.connection_start,
            key.connection_end,
            key.version,
            key.modification
        ],
        |row| Ok(VehicleTypePair::new(row.get(0)?, row.get(1)?)),
    )?;
    let pairs = rows.collect::<rusqlite::Result<BTreeSet<_>>>()?;
    Ok(pairs)
}
