//! Links derived from article link templates
//!
//! When both unit connections a template calls for exist on the same unit,
//! the template becomes a concrete link between them. Derivation is
//! idempotent: a pair that already has a link is left untouched.

use std::collections::{BTreeMap, BTreeSet};

use rusqlite::{params, Connection, Transaction};
use serde::Serialize;

use super::article_link::{self, row_to_template, ArticleLink};
use super::catalog::{self, UnitConnection};
use super::in_transaction;
use super::link::{latest_key, LinkStore};
use crate::core::error::{CableListError, Result};
use crate::core::keys::{ArticleConnectionId, LinkVersion, ModificationKind, UnitConnectionId, UnitId};
use crate::core::link::LinkData;
use crate::core::link_key::LinkPk;

/// A template whose two connections exist on one unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateMatch {
    pub template: ArticleLink,
    pub start: UnitConnectionId,
    pub end: UnitConnectionId,
}

/// Outcome of materializing one template match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "key", rename_all = "lowercase")]
pub enum Materialized {
    /// A new link was stored under this key
    Created(LinkPk),
    /// The pair already had a link; this is its latest history entry
    Existing(LinkPk),
}

impl Materialized {
    pub fn key(&self) -> &LinkPk {
        match self {
            Materialized::Created(key) | Materialized::Existing(key) => key,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Materialized::Created(_))
    }
}

/// Template derivation engine
pub struct DerivationEngine<'db> {
    conn: &'db mut Connection,
}

impl<'db> DerivationEngine<'db> {
    pub(crate) fn new(conn: &'db mut Connection) -> Self {
        Self { conn }
    }

    /// Every template that can be materialized on `unit`
    pub fn connections_satisfying_templates(&self, unit: UnitId) -> Result<Vec<TemplateMatch>> {
        connections_satisfying_templates(self.conn, unit)
    }

    /// Store the link a template match describes
    pub fn materialize(
        &mut self,
        template: &ArticleLink,
        start: UnitConnectionId,
        end: UnitConnectionId,
        version: LinkVersion,
        modification: ModificationKind,
    ) -> Result<Materialized> {
        in_transaction(self.conn, |tx| {
            Self::materialize_in(tx, template, start, end, version, modification)
        })
    }

    pub fn materialize_in(
        tx: &Transaction<'_>,
        template: &ArticleLink,
        start: UnitConnectionId,
        end: UnitConnectionId,
        version: LinkVersion,
        modification: ModificationKind,
    ) -> Result<Materialized> {
        let start_connection = resolve(tx, template, start)?;
        let end_connection = resolve(tx, template, end)?;

        if start_connection.unit != end_connection.unit {
            return Err(CableListError::TemplateResolution {
                template: template.to_string(),
                unit: start_connection.unit.to_string(),
                reason: format!(
                    "connection {} belongs to unit {}",
                    end, end_connection.unit
                ),
            });
        }
        if start_connection.article_connection != Some(template.connection_start)
            || end_connection.article_connection != Some(template.connection_end)
        {
            return Err(CableListError::TemplateResolution {
                template: template.to_string(),
                unit: start_connection.unit.to_string(),
                reason: format!(
                    "connections {} and {} do not refer to the template's article connections",
                    start, end
                ),
            });
        }

        if let Some(existing) = latest_key(tx, start, end)? {
            tracing::debug!(template = %template, key = %existing, "link already derived");
            return Ok(Materialized::Existing(existing));
        }

        let key = LinkPk::new(start, end, version, modification)?;
        let data = LinkData::new(key, template.link_attributes());
        LinkStore::add_in(tx, &data, &BTreeSet::new())?;
        tracing::debug!(template = %template, key = %key, "derived link");
        Ok(Materialized::Created(key))
    }

    /// Derive the links a newly registered connection completes
    ///
    /// Only templates involving the connection's article connection are
    /// examined; the outcome is the same as a full [`DerivationEngine::derive_unit`].
    pub fn on_connection_added(
        &mut self,
        connection: UnitConnectionId,
        version: LinkVersion,
        modification: ModificationKind,
    ) -> Result<Vec<Materialized>> {
        let outcomes = in_transaction(self.conn, |tx| {
            let Some(added) = catalog::unit_connection(tx, connection)? else {
                tracing::warn!(%connection, "unknown connection, nothing derived");
                return Ok(Vec::new());
            };
            let Some(article_connection) = added.article_connection else {
                tracing::debug!(%connection, "connection has no article connection");
                return Ok(Vec::new());
            };

            // Keyed by (start, end, template) so a template linking an article
            // connection to itself is only materialized once
            let mut matches = BTreeMap::new();
            for template in article_link::involving(tx, article_connection)? {
                let id = (template.connection_start, template.connection_end);
                if template.connection_start == article_connection {
                    for end in connections_on_unit(tx, added.unit, template.connection_end)? {
                        matches.insert((connection, end, id), template.clone());
                    }
                }
                if template.connection_end == article_connection {
                    for start in connections_on_unit(tx, added.unit, template.connection_start)? {
                        matches.insert((start, connection, id), template.clone());
                    }
                }
            }

            let mut outcomes = Vec::with_capacity(matches.len());
            for ((start, end, _), template) in &matches {
                outcomes.push(Self::materialize_in(
                    tx,
                    template,
                    *start,
                    *end,
                    version,
                    modification,
                )?);
            }
            Ok(outcomes)
        })?;

        let created = outcomes.iter().filter(|o| o.is_created()).count();
        tracing::info!(%connection, created, "derived links for new connection");
        Ok(outcomes)
    }

    /// Derive every link the templates call for on `unit`
    pub fn derive_unit(
        &mut self,
        unit: UnitId,
        version: LinkVersion,
        modification: ModificationKind,
    ) -> Result<Vec<Materialized>> {
        let outcomes = in_transaction(self.conn, |tx| {
            let matches = connections_satisfying_templates(tx, unit)?;
            matches
                .iter()
                .map(|m| Self::materialize_in(tx, &m.template, m.start, m.end, version, modification))
                .collect::<Result<Vec<_>>>()
        })?;

        let created = outcomes.iter().filter(|o| o.is_created()).count();
        tracing::info!(%unit, created, total = outcomes.len(), "derived links for unit");
        Ok(outcomes)
    }
}

fn resolve(
    conn: &Connection,
    template: &ArticleLink,
    connection: UnitConnectionId,
) -> Result<UnitConnection> {
    catalog::unit_connection(conn, connection)?.ok_or_else(|| CableListError::TemplateResolution {
        template: template.to_string(),
        unit: "?".to_string(),
        reason: format!("connection {} does not exist", connection),
    })
}

fn connections_satisfying_templates(conn: &Connection, unit: UnitId) -> Result<Vec<TemplateMatch>> {
    let mut stmt = conn.prepare(
        "SELECT al.ArticleConnectionStart_Id_FK, al.ArticleConnectionEnd_Id_FK,
                al.LinkType_Code_FK, al.LinkDirection_Code_FK, al.Identification, al.Resistance,
                cs.Id_PK, ce.Id_PK
         FROM ArticleLink_tbl al
         JOIN UnitConnection_tbl cs ON cs.ArticleConnection_Id_FK = al.ArticleConnectionStart_Id_FK
         JOIN UnitConnection_tbl ce ON ce.ArticleConnection_Id_FK = al.ArticleConnectionEnd_Id_FK
                                   AND ce.Unit_Id_FK = cs.Unit_Id_FK
         WHERE cs.Unit_Id_FK = ?1
         ORDER BY cs.Id_PK, ce.Id_PK, al.ArticleConnectionStart_Id_FK, al.ArticleConnectionEnd_Id_FK",
    )?;
    let rows = stmt.query_map(params![unit], |row| {
        Ok(TemplateMatch {
            template: row_to_template(row)?,
            start: row.get(6)?,
            end: row.get(7)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn connections_on_unit(
    conn: &Connection,
    unit: UnitId,
    article_connection: ArticleConnectionId,
) -> Result<Vec<UnitConnectionId>> {
    let mut stmt = conn.prepare_cached(
        "SELECT Id_PK FROM UnitConnection_tbl
         WHERE Unit_Id_FK = ?1 AND ArticleConnection_Id_FK = ?2
         ORDER BY Id_PK",
    )?;
    let rows = stmt.query_map(params![unit, article_connection], |row| row.get(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
