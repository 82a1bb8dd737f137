//! Database schema initialization

use rusqlite::params;

use super::{Database, SCHEMA_VERSION};
use crate::core::error::Result;
use crate::core::keys::{LinkDirection, LinkType, ModificationKind};

impl Database {
    /// Create every table and fill the code tables
    pub(super) fn init_schema(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Code tables
            CREATE TABLE IF NOT EXISTS Modification_tbl (
                Code_PK TEXT PRIMARY KEY,
                SortOrder INTEGER NOT NULL,
                NameEN TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS LinkType_tbl (
                Code_PK TEXT PRIMARY KEY,
                NameEN TEXT NOT NULL,
                ValueUnit TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS LinkDirection_tbl (
                Code_PK TEXT PRIMARY KEY,
                PictureAscii TEXT NOT NULL,
                NameEN TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS LinkVersion_tbl (
                Version_PK INTEGER PRIMARY KEY CHECK (Version_PK > 0),
                Version REAL NOT NULL
            );

            -- Catalog
            CREATE TABLE IF NOT EXISTS VehicleType_tbl (
                Id_PK INTEGER PRIMARY KEY AUTOINCREMENT,
                Type TEXT NOT NULL,
                SubType TEXT,
                SeriesNumber TEXT
            );

            CREATE TABLE IF NOT EXISTS Unit_tbl (
                Id_PK INTEGER PRIMARY KEY AUTOINCREMENT,
                SchemaPosition TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS ArticleConnection_tbl (
                Id_PK INTEGER PRIMARY KEY AUTOINCREMENT,
                ArticleContactName TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS UnitConnection_tbl (
                Id_PK INTEGER PRIMARY KEY AUTOINCREMENT,
                Unit_Id_FK INTEGER NOT NULL REFERENCES Unit_tbl(Id_PK),
                ArticleConnection_Id_FK INTEGER REFERENCES ArticleConnection_tbl(Id_PK),
                UnitContactName TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_unit_connection_unit ON UnitConnection_tbl(Unit_Id_FK);
            CREATE INDEX IF NOT EXISTS idx_unit_connection_article
                ON UnitConnection_tbl(ArticleConnection_Id_FK);

            -- Article link templates
            CREATE TABLE IF NOT EXISTS ArticleLink_tbl (
                ArticleConnectionStart_Id_FK INTEGER NOT NULL REFERENCES ArticleConnection_tbl(Id_PK),
                ArticleConnectionEnd_Id_FK INTEGER NOT NULL REFERENCES ArticleConnection_tbl(Id_PK),
                LinkType_Code_FK TEXT NOT NULL REFERENCES LinkType_tbl(Code_PK),
                LinkDirection_Code_FK TEXT NOT NULL REFERENCES LinkDirection_tbl(Code_PK),
                Identification TEXT,
                Resistance REAL,
                PRIMARY KEY (ArticleConnectionStart_Id_FK, ArticleConnectionEnd_Id_FK)
            );
            CREATE INDEX IF NOT EXISTS idx_article_link_end ON ArticleLink_tbl(ArticleConnectionEnd_Id_FK);

            -- Links: one row per connection pair, attributes shared by its history
            CREATE TABLE IF NOT EXISTS Link_tbl (
                UnitConnectionStart_Id_FK INTEGER NOT NULL REFERENCES UnitConnection_tbl(Id_PK),
                UnitConnectionEnd_Id_FK INTEGER NOT NULL REFERENCES UnitConnection_tbl(Id_PK),
                LinkType_Code_FK TEXT NOT NULL REFERENCES LinkType_tbl(Code_PK),
                LinkDirection_Code_FK TEXT NOT NULL REFERENCES LinkDirection_tbl(Code_PK),
                ArticleConnectionStart_Id_FK INTEGER,
                ArticleConnectionEnd_Id_FK INTEGER,
                Wire_Id_FK INTEGER,
                Identification TEXT,
                Resistance REAL,
                Length REAL,
                Remarks TEXT,
                PRIMARY KEY (UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK),
                FOREIGN KEY (ArticleConnectionStart_Id_FK, ArticleConnectionEnd_Id_FK)
                    REFERENCES ArticleLink_tbl(ArticleConnectionStart_Id_FK, ArticleConnectionEnd_Id_FK)
            );
            CREATE INDEX IF NOT EXISTS idx_link_end ON Link_tbl(UnitConnectionEnd_Id_FK);

            -- Change history of a link across versions
            CREATE TABLE IF NOT EXISTS LinkModification_tbl (
                UnitConnectionStart_Id_FK INTEGER NOT NULL,
                UnitConnectionEnd_Id_FK INTEGER NOT NULL,
                Version_FK INTEGER NOT NULL REFERENCES LinkVersion_tbl(Version_PK),
                Modification_Code_FK TEXT NOT NULL REFERENCES Modification_tbl(Code_PK),
                PRIMARY KEY (
                    UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK,
                    Version_FK, Modification_Code_FK
                ),
                FOREIGN KEY (UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK)
                    REFERENCES Link_tbl(UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK)
            );
            CREATE INDEX IF NOT EXISTS idx_link_modification_version ON LinkModification_tbl(Version_FK);

            -- Vehicle types using a link, scoped to one history entry
            CREATE TABLE IF NOT EXISTS VehicleType_Link_tbl (
                VehicleTypeStart_Id_FK INTEGER NOT NULL REFERENCES VehicleType_tbl(Id_PK),
                VehicleTypeEnd_Id_FK INTEGER NOT NULL REFERENCES VehicleType_tbl(Id_PK),
                UnitConnectionStart_Id_FK INTEGER NOT NULL,
                UnitConnectionEnd_Id_FK INTEGER NOT NULL,
                Link_Version_FK INTEGER NOT NULL,
                Link_Modification_Code_FK TEXT NOT NULL,
                PRIMARY KEY (
                    VehicleTypeStart_Id_FK, VehicleTypeEnd_Id_FK,
                    UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK,
                    Link_Version_FK, Link_Modification_Code_FK
                ),
                FOREIGN KEY (
                    UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK,
                    Link_Version_FK, Link_Modification_Code_FK
                ) REFERENCES LinkModification_tbl(
                    UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK,
                    Version_FK, Modification_Code_FK
                )
            );
            CREATE INDEX IF NOT EXISTS idx_vehicle_type_link_key ON VehicleType_Link_tbl(
                UnitConnectionStart_Id_FK, UnitConnectionEnd_Id_FK,
                Link_Version_FK, Link_Modification_Code_FK
            );
            "#,
        )?;

        for kind in ModificationKind::all() {
            tx.execute(
                "INSERT OR IGNORE INTO Modification_tbl (Code_PK, SortOrder, NameEN) VALUES (?1, ?2, ?3)",
                params![kind.code(), kind.sort_order(), kind.name()],
            )?;
        }
        for link_type in LinkType::all() {
            tx.execute(
                "INSERT OR IGNORE INTO LinkType_tbl (Code_PK, NameEN, ValueUnit) VALUES (?1, ?2, ?3)",
                params![link_type.code(), link_type.name(), link_type.value_unit()],
            )?;
        }
        for direction in LinkDirection::all() {
            tx.execute(
                "INSERT OR IGNORE INTO LinkDirection_tbl (Code_PK, PictureAscii, NameEN) VALUES (?1, ?2, ?3)",
                params![direction.code(), direction.picture(), direction.name()],
            )?;
        }

        tx.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        tx.commit()?;

        tracing::debug!(version = SCHEMA_VERSION, "created link database schema");
        Ok(())
    }
}
