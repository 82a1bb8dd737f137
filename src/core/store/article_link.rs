//! Article link templates
//!
//! A template links two article connections. Every unit built from the
//! article gets a concrete link between the unit connections that refer to
//! them (see [`super::derivation`]).

use std::fmt;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::keys::{ArticleConnectionId, LinkDirection, LinkType};
use crate::core::link::{ArticleLinkRef, LinkAttributes};

const TEMPLATE_COLUMNS: &str = "ArticleConnectionStart_Id_FK, ArticleConnectionEnd_Id_FK, \
     LinkType_Code_FK, LinkDirection_Code_FK, Identification, Resistance";

/// Template for links between two article connections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleLink {
    pub connection_start: ArticleConnectionId,
    pub connection_end: ArticleConnectionId,
    pub link_type: LinkType,
    pub direction: LinkDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
}

impl ArticleLink {
    pub fn new(
        connection_start: ArticleConnectionId,
        connection_end: ArticleConnectionId,
        link_type: LinkType,
        direction: LinkDirection,
    ) -> Self {
        Self {
            connection_start,
            connection_end,
            link_type,
            direction,
            identification: None,
            resistance: None,
        }
    }

    pub fn reference(&self) -> ArticleLinkRef {
        ArticleLinkRef {
            connection_start: self.connection_start,
            connection_end: self.connection_end,
        }
    }

    /// Attributes of a link derived from this template
    pub fn link_attributes(&self) -> LinkAttributes {
        LinkAttributes {
            link_type: self.link_type,
            direction: self.direction,
            identification: self.identification.clone(),
            resistance: self.resistance,
            article_link: Some(self.reference()),
            ..Default::default()
        }
    }
}

impl fmt::Display for ArticleLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.connection_start, self.connection_end)
    }
}

/// Read access to article link templates
pub struct ArticleLinks<'db> {
    conn: &'db Connection,
}

impl<'db> ArticleLinks<'db> {
    pub(crate) fn new(conn: &'db Connection) -> Self {
        Self { conn }
    }

    pub fn get(
        &self,
        start: ArticleConnectionId,
        end: ArticleConnectionId,
    ) -> Result<Option<ArticleLink>> {
        let template = self
            .conn
            .query_row(
                &format!(
                    "SELECT {TEMPLATE_COLUMNS} FROM ArticleLink_tbl
                     WHERE ArticleConnectionStart_Id_FK = ?1 AND ArticleConnectionEnd_Id_FK = ?2"
                ),
                params![start, end],
                row_to_template,
            )
            .optional()?;
        Ok(template)
    }

    pub fn list(&self) -> Result<Vec<ArticleLink>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM ArticleLink_tbl
             ORDER BY ArticleConnectionStart_Id_FK, ArticleConnectionEnd_Id_FK"
        ))?;
        let rows = stmt.query_map([], row_to_template)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Templates with `article_connection` at either end
    pub fn involving(&self, article_connection: ArticleConnectionId) -> Result<Vec<ArticleLink>> {
        involving(self.conn, article_connection)
    }
}

pub(crate) fn involving(
    conn: &Connection,
    article_connection: ArticleConnectionId,
) -> Result<Vec<ArticleLink>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM ArticleLink_tbl
         WHERE ArticleConnectionStart_Id_FK = ?1 OR ArticleConnectionEnd_Id_FK = ?1
         ORDER BY ArticleConnectionStart_Id_FK, ArticleConnectionEnd_Id_FK"
    ))?;
    let rows = stmt.query_map(params![article_connection], row_to_template)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub(crate) fn row_to_template(row: &Row<'_>) -> rusqlite::Result<ArticleLink> {
    Ok(ArticleLink {
        connection_start: row.get(0)?,
        connection_end: row.get(1)?,
        link_type: row.get(2)?,
        direction: row.get(3)?,
        identification: row.get(4)?,
        resistance: row.get(5)?,
    })
}
