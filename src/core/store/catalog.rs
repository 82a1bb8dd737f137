//! Units, connections and vehicle types referenced by links
//!
//! The catalog is maintained by other parts of the design tool; this store
//! only offers what links and templates need: creating rows and resolving a
//! unit connection to its unit and article connection.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::article_link::ArticleLink;
use crate::core::error::Result;
use crate::core::keys::{ArticleConnectionId, UnitConnectionId, UnitId, VehicleTypeId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    pub id: UnitId,
    pub schema_position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleConnection {
    pub id: ArticleConnectionId,
    pub contact_name: String,
}

/// Physical connection point of a unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitConnection {
    pub id: UnitConnectionId,
    pub unit: UnitId,
    /// Article connection this connection was built from, if any
    pub article_connection: Option<ArticleConnectionId>,
    pub contact_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleType {
    pub id: VehicleTypeId,
    pub type_name: String,
    pub sub_type: Option<String>,
    pub series_number: Option<String>,
}

/// Catalog store
pub struct Catalog<'db> {
    conn: &'db mut Connection,
}

impl<'db> Catalog<'db> {
    pub(crate) fn new(conn: &'db mut Connection) -> Self {
        Self { conn }
    }

    pub fn add_unit(&mut self, schema_position: &str) -> Result<UnitId> {
        self.conn.execute(
            "INSERT INTO Unit_tbl (SchemaPosition) VALUES (?1)",
            params![schema_position],
        )?;
        let id = UnitId::new(self.conn.last_insert_rowid());
        tracing::debug!(%id, schema_position, "added unit");
        Ok(id)
    }

    pub fn add_article_connection(&mut self, contact_name: &str) -> Result<ArticleConnectionId> {
        self.conn.execute(
            "INSERT INTO ArticleConnection_tbl (ArticleContactName) VALUES (?1)",
            params![contact_name],
        )?;
        let id = ArticleConnectionId::new(self.conn.last_insert_rowid());
        tracing::debug!(%id, contact_name, "added article connection");
        Ok(id)
    }

    pub fn add_unit_connection(
        &mut self,
        unit: UnitId,
        article_connection: Option<ArticleConnectionId>,
        contact_name: &str,
    ) -> Result<UnitConnectionId> {
        self.conn.execute(
            "INSERT INTO UnitConnection_tbl (Unit_Id_FK, ArticleConnection_Id_FK, UnitContactName)
             VALUES (?1, ?2, ?3)",
            params![unit, article_connection, contact_name],
        )?;
        let id = UnitConnectionId::new(self.conn.last_insert_rowid());
        tracing::debug!(%id, %unit, contact_name, "added unit connection");
        Ok(id)
    }

    pub fn add_vehicle_type(
        &mut self,
        type_name: &str,
        sub_type: Option<&str>,
        series_number: Option<&str>,
    ) -> Result<VehicleTypeId> {
        self.conn.execute(
            "INSERT INTO VehicleType_tbl (Type, SubType, SeriesNumber) VALUES (?1, ?2, ?3)",
            params![type_name, sub_type, series_number],
        )?;
        let id = VehicleTypeId::new(self.conn.last_insert_rowid());
        tracing::debug!(%id, type_name, "added vehicle type");
        Ok(id)
    }

    /// Register an article link template
    pub fn add_article_link(&mut self, template: &ArticleLink) -> Result<()> {
        self.conn.execute(
            "INSERT INTO ArticleLink_tbl (
                ArticleConnectionStart_Id_FK, ArticleConnectionEnd_Id_FK,
                LinkType_Code_FK, LinkDirection_Code_FK, Identification, Resistance
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                template.connection_start,
                template.connection_end,
                template.link_type,
                template.direction,
                template.identification,
                template.resistance,
            ],
        )?;
        tracing::debug!(template = %template, "added article link");
        Ok(())
    }

    pub fn units(&self) -> Result<Vec<Unit>> {
        let mut stmt = self
            .conn
            .prepare("SELECT Id_PK, SchemaPosition FROM Unit_tbl ORDER BY Id_PK")?;
        let rows = stmt.query_map([], |row| {
            Ok(Unit {
                id: row.get(0)?,
                schema_position: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn article_connections(&self) -> Result<Vec<ArticleConnection>> {
        let mut stmt = self
            .conn
            .prepare("SELECT Id_PK, ArticleContactName FROM ArticleConnection_tbl ORDER BY Id_PK")?;
        let rows = stmt.query_map([], |row| {
            Ok(ArticleConnection {
                id: row.get(0)?,
                contact_name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Unit connections, optionally only those of one unit
    pub fn unit_connections(&self, unit: Option<UnitId>) -> Result<Vec<UnitConnection>> {
        let mut stmt = self.conn.prepare(
            "SELECT Id_PK, Unit_Id_FK, ArticleConnection_Id_FK, UnitContactName
             FROM UnitConnection_tbl
             WHERE ?1 IS NULL OR Unit_Id_FK = ?1
             ORDER BY Id_PK",
        )?;
        let rows = stmt.query_map(params![unit], row_to_unit_connection)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn unit_connection(&self, id: UnitConnectionId) -> Result<Option<UnitConnection>> {
        unit_connection(self.conn, id)
    }

    pub fn vehicle_types(&self) -> Result<Vec<VehicleType>> {
        let mut stmt = self.conn.prepare(
            "SELECT Id_PK, Type, SubType, SeriesNumber FROM VehicleType_tbl ORDER BY Id_PK",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(VehicleType {
                id: row.get(0)?,
                type_name: row.get(1)?,
                sub_type: row.get(2)?,
                series_number: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Unit owning a connection
    pub fn unit_of(&self, connection: UnitConnectionId) -> Result<Option<UnitId>> {
        Ok(unit_connection(self.conn, connection)?.map(|c| c.unit))
    }

    /// Article connection a unit connection refers to
    pub fn article_connection_of(
        &self,
        connection: UnitConnectionId,
    ) -> Result<Option<ArticleConnectionId>> {
        Ok(unit_connection(self.conn, connection)?.and_then(|c| c.article_connection))
    }
}

pub(crate) fn unit_connection(
    conn: &Connection,
    id: UnitConnectionId,
) -> Result<Option<UnitConnection>> {
    let connection = conn
        .query_row(
            "SELECT Id_PK, Unit_Id_FK, ArticleConnection_Id_FK, UnitContactName
             FROM UnitConnection_tbl WHERE Id_PK = ?1",
            params![id],
            row_to_unit_connection,
        )
        .optional()?;
    Ok(connection)
}

fn row_to_unit_connection(row: &Row<'_>) -> rusqlite::Result<UnitConnection> {
    Ok(UnitConnection {
        id: row.get(0)?,
        unit: row.get(1)?,
        article_connection: row.get(2)?,
        contact_name: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CableListError;
    use crate::core::store::fixture::Fixture;

    #[test]
    fn test_resolve_unit_connection() {
        let mut fx = Fixture::new();
        let free = fx
            .db
            .catalog()
            .add_unit_connection(fx.other_unit, None, "PE")
            .unwrap();

        let catalog = fx.db.catalog();
        assert_eq!(catalog.unit_of(fx.connections[0]).unwrap(), Some(fx.unit));
        assert_eq!(
            catalog.article_connection_of(fx.connections[2]).unwrap(),
            Some(fx.article_connections[2])
        );
        assert_eq!(catalog.unit_of(free).unwrap(), Some(fx.other_unit));
        assert_eq!(catalog.article_connection_of(free).unwrap(), None);
        assert_eq!(catalog.unit_of(UnitConnectionId::new(999)).unwrap(), None);
    }

    #[test]
    fn test_listings() {
        let mut fx = Fixture::new();
        let catalog = fx.db.catalog();
        assert_eq!(catalog.units().unwrap().len(), 2);
        assert_eq!(catalog.article_connections().unwrap().len(), 4);
        assert_eq!(catalog.vehicle_types().unwrap().len(), 8);
        assert_eq!(catalog.unit_connections(None).unwrap().len(), 4);
        assert!(catalog.unit_connections(Some(fx.other_unit)).unwrap().is_empty());

        let first = &catalog.vehicle_types().unwrap()[0];
        assert_eq!(first.type_name, "RE 460");
        assert_eq!(first.series_number.as_deref(), Some("001"));
    }

    #[test]
    fn test_connection_requires_existing_unit() {
        let mut fx = Fixture::new();
        let err = fx
            .db
            .catalog()
            .add_unit_connection(UnitId::new(999), None, "1");
        assert!(matches!(err, Err(CableListError::Storage(_))));
    }
}
